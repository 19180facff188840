use actix_web::web::{self};

use middleware::auth::AuthMiddleware;

pub mod dtos {
    pub mod auth;
}

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod auth;
    pub mod user;
}

mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::post_sign_up)
        .service(routes::auth::post_sign_in)
        .service(routes::auth::post_sign_out)
}

pub fn mount_user() -> actix_web::Scope {
    web::scope("/user")
        .service(routes::user::get_users)
        .service(routes::user::get_user)
        .service(routes::user::post_user)
        .service(routes::user::put_user)
        .service(routes::user::delete_user)
}

// Bearer-token middleware for scopes that require a verified identity
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}
