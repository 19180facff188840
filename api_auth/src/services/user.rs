use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, password_hash::PasswordHasher};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::jwt;
use db::dtos::user::UserCreateRequest;
use db::models::user::{AuthCredentials, User};
use sqlx::PgPool;

use crate::dtos::auth::SignUpRequest;

/// Inserts user record and credentials to the database and issues the
/// first token, all inside one transaction. Any failure before commit,
/// token signing included, leaves no partial credential behind.
pub async fn register_user(
    pool: &PgPool,
    req: &SignUpRequest,
    config: &Config,
) -> Res<(User, String)> {
    let email = req.email.trim().to_lowercase();

    let mut tx = pool.begin().await?;

    if db::user::exists_user_by_email(&mut *tx, &email).await? {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    // hash the password
    let password_hash = hash_password(&req.password)?;

    // insert user; a concurrent sign-up can still slip past the existence
    // check, so the unique index is the final arbiter
    let user = db::user::insert_user(
        &mut *tx,
        UserCreateRequest {
            name: req.name.trim().to_string(),
            email,
        },
    )
    .await
    .map_err(conflict_on_duplicate_email)?;

    // insert credentials
    db::user::insert_user_with_credentials(
        &mut *tx,
        AuthCredentials {
            user_id: user.id,
            password_hash,
        },
    )
    .await?;

    let token = jwt::generate_jwt(user.id, &config.jwt_config)?;

    tx.commit().await?;
    Ok((user, token))
}

pub fn hash_password(password: &str) -> Res<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn conflict_on_duplicate_email(err: AppError) -> AppError {
    match &err {
        AppError::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            AppError::Conflict("User already exists".to_string())
        }
        _ => err,
    }
}
