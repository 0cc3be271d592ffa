//! Signed token payloads

use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    /// Subject (user ID, string-encoded)
    pub sub: String,
    /// Display name, "<first> <last>"
    pub name: String,
    pub aud: String,
    pub iss: String,
    pub admin: bool,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a refresh token
///
/// Subject and expiry only. Any other claim, such as the `iss` of an access
/// token, makes the token unreadable as a refresh token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: i64,
}

/// Access and refresh token minted together
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl AccessClaims {
    /// Parse the subject back into a user ID
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

impl RefreshClaims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}
