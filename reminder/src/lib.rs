use actix_web::web::{self};

pub mod machine;
pub mod plan;
pub mod routes;
pub mod scheduler;
pub mod service;

mod runner;

pub fn mount_workflow() -> actix_web::Scope {
    web::scope("/workflow").service(routes::post_subscription_reminder)
}
