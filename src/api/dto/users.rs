/*
 * Responsibility
 * - Auth/user request and response DTOs
 * - validate() does the format checks; business rules stay in handlers
 */
use serde::{Deserialize, Serialize};

use crate::repos::user_repo::UserRow;

/// Loose shape check: one '@', non-empty local part, dotted domain.
pub(crate) fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > 50 {
            return Err("username must be <= 50 chars");
        }
        if self.email.len() > 150 || !looks_like_email(&self.email) {
            return Err("email is not a valid address");
        }
        if self.password.len() < 6 {
            return Err("password must be >= 6 chars");
        }
        if self.password.len() > 128 {
            return Err("password must be <= 128 chars");
        }
        Ok(())
    }
}

/// OAuth2 password-grant form fields: `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RequestEmail {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<UserRow> for UserResponse {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SignupRequest {
        SignupRequest {
            username: "deadpool".to_string(),
            email: "deadpool@example.com".to_string(),
            password: "123456789".to_string(),
        }
    }

    #[test]
    fn accepts_a_valid_signup() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_blank_username() {
        let mut req = valid();
        req.username = "   ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_short_password() {
        let mut req = valid();
        req.password = "12345".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_addresses_without_a_domain() {
        assert!(!looks_like_email("nobody"));
        assert!(!looks_like_email("nobody@"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("nobody@localhost"));
        assert!(looks_like_email("nobody@example.com"));
    }

    #[test]
    fn response_mirrors_the_user_row() {
        let row = UserRow {
            id: 1,
            username: "a".to_string(),
            email: "a@example.com".to_string(),
            password: "$argon2id$...".to_string(),
            avatar: Some("https://example.com/a.png".to_string()),
            refresh_token: None,
            confirmed: true,
        };
        let res = UserResponse::from(row.clone());
        assert_eq!(res.id, row.id);
        assert_eq!(res.email, row.email);
        assert_eq!(res.username, row.username);
        assert_eq!(res.avatar, row.avatar);
    }
}
