use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub exp: usize,
}

/// Generates JWT token embedding the user id, based on JWT configuration options
pub fn generate_jwt(user_id: Uuid, config: &JwtConfig) -> Res<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.expiration_hours))
        .expect("valid timestamp")
        .timestamp();

    let claims = JwtClaims {
        user_id,
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Extracts claims object from JWT token.
/// Requires JWT secret.
pub fn validate_jwt(token: &str, secret: &str) -> Res<JwtClaims> {
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, hours: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_hours: hours,
        }
    }

    #[test]
    fn issued_token_resolves_back_to_the_same_user() {
        let config = test_config("top-secret", 24);
        let user_id = Uuid::new_v4();

        let token = generate_jwt(user_id, &config).unwrap();
        let claims = validate_jwt(&token, &config.secret).unwrap();

        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let config = test_config("first-secret", 24);
        let token = generate_jwt(Uuid::new_v4(), &config).unwrap();

        assert!(validate_jwt(&token, "second-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Expiration lands 2 hours in the past, well beyond any leeway.
        let config = test_config("top-secret", -2);
        let token = generate_jwt(Uuid::new_v4(), &config).unwrap();

        assert!(validate_jwt(&token, &config.secret).is_err());
    }
}
