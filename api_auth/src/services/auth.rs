use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;

use crate::dtos::auth::SignInRequest;

/// Authenticates existing user.
/// If no user matches the email, returns 404.
/// If the password does not match the stored hash, returns 401.
pub async fn authenticate_user(pool: &PgPool, login_data: &SignInRequest) -> Res<User> {
    let email = login_data.email.trim().to_lowercase();

    let Some((user, credentials)) = db::user::get_user_with_password_hash(pool, &email).await?
    else {
        return Err(AppError::NotFound("User not found".to_string()));
    };

    let parsed_hash = PasswordHash::new(&credentials.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Argon2::default()
        .verify_password(login_data.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid credentials".to_string()))?;

    Ok(user)
}
