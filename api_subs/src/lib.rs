use actix_web::web::{self};

pub mod routes {
    pub mod sub;
}

mod services {
    pub(crate) mod sub;
}

mod dtos {
    pub(crate) mod sub;
}

pub fn mount_subs() -> actix_web::Scope {
    // upcoming-renewals and user/{id} must register ahead of {id}
    web::scope("/subscription")
        .service(routes::sub::get_upcoming_renewals)
        .service(routes::sub::get_user_subscriptions)
        .service(routes::sub::get_subscriptions)
        .service(routes::sub::post_subscription)
        .service(routes::sub::put_cancel_subscription)
        .service(routes::sub::get_subscription_by_id)
        .service(routes::sub::put_subscription)
        .service(routes::sub::delete_subscription)
}
