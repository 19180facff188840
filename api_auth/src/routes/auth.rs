use actix_web::{Responder, post, web};
use common::env_config::Config;
use common::error::Res;
use common::http::Success;
use common::jwt;
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::auth::{AuthResponse, SignInRequest, SignUpRequest};
use crate::services;

/// Registers a new user with email and password authentication.
///
/// # Input
/// - `req`: JSON payload containing name, email and password
/// - `pool`: Database connection pool
/// - `config`: Application configuration
///
/// # Output
/// - Success: 201 Created with `{ token, user }`
/// - Error: 409 Conflict if the email is already registered,
///   400 Bad Request on a malformed payload
#[post("/sign-up")]
async fn post_sign_up(
    req: web::Json<SignUpRequest>,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let data = req.into_inner();
    data.validate()?;

    let (user, token) = services::user::register_user(pg_pool, &data, &config).await?;
    Success::created(AuthResponse { token, user })
}

/// Authenticates a user with email and password.
///
/// # Output
/// - Success: 200 OK with `{ token, user }`
/// - Error: 404 Not Found for an unknown email,
///   401 Unauthorized for a wrong password
#[post("/sign-in")]
pub async fn post_sign_in(
    login_data: web::Json<SignInRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user = services::auth::authenticate_user(pg_pool, &login_data.into_inner()).await?;
    let token = jwt::generate_jwt(user.id, &config.jwt_config)?;
    Success::ok(AuthResponse { token, user })
}

/// Stateless acknowledgment; tokens stay valid until they expire.
#[post("/sign-out")]
pub async fn post_sign_out() -> Res<impl Responder> {
    Success::ok(serde_json::json!({ "message": "User signed out" }))
}
