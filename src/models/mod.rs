//! Data models

use serde::{Deserialize, Serialize};
use sqlx::types::chrono::{DateTime, Utc};
use validator::Validate;

/// User model, the principal a token vouches for
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// bcrypt hash, never serialised
    #[serde(skip_serializing, default)]
    pub password: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name carried in access tokens
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct Credentials {
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request to insert a user
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request to update an existing user
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUser {
    pub id: i64,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Refresh token request (form encoded)
#[derive(Debug, Default, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_password_hash_not_serialised() {
        let user = User {
            id: 1,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: "admin@example.com".to_string(),
            password: "$2b$04$hash".to_string(),
            is_admin: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["first_name"], "Admin");
        assert_eq!(user.full_name(), "Admin User");
    }

    #[test]
    fn test_new_user_rejects_unknown_fields() {
        let result: Result<NewUser, _> = serde_json::from_str(
            r#"{"foo":"bar","first_name":"Jack","last_name":"Smith","email":"jack@example.com"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_validation() {
        let creds = Credentials {
            email: "admin@example.com".to_string(),
            password: String::new(),
        };
        assert!(creds.validate().is_err());

        let creds = Credentials {
            email: "not-an-email".to_string(),
            password: "secret".to_string(),
        };
        assert!(creds.validate().is_err());
    }
}
