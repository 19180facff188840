use common::error::{AppError, Res};
use db::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Res<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("User name is required".to_string()));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Email is not valid".to_string()));
        }
        if self.password.len() < 6 {
            return Err(AppError::Validation(
                "Password must contain at least 6 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_a_well_formed_payload() {
        assert!(request("Jane", "jane@example.com", "hunter22").validate().is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(request("  ", "jane@example.com", "hunter22").validate().is_err());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "jane", "jane@", "@example.com", "jane@example", "ja ne@ex.com"] {
            assert!(request("Jane", email, "hunter22").validate().is_err(), "{email}");
        }
    }

    #[test]
    fn rejects_short_password() {
        assert!(request("Jane", "jane@example.com", "12345").validate().is_err());
    }
}
