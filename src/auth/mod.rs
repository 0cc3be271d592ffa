//! Token-based authentication
//!
//! - Paired access/refresh token minting (HMAC-SHA256 signed JWTs)
//! - Bearer header verification for protected routes
//! - Refresh-window policy governing when a refresh token may be exchanged
//!
//! The subsystem is stateless: validity is derived from signature, expiry
//! and issuer alone. There is no server-side token store and no revocation.

use chrono::Duration;

mod claims;
mod issuer;
mod password;
mod refresh;
mod service;
mod verifier;

pub use claims::{AccessClaims, RefreshClaims, TokenPair};
pub use issuer::{SigningError, TokenIssuer};
pub use password::{
    hash_password, hash_password_with_cost, BcryptVerifier, CredentialVerifier, PasswordError,
};
pub use refresh::{RefreshError, RefreshFlow, RefreshRejection};
pub use service::{AuthService, LoginError};
pub use verifier::{TokenVerifier, VerifiedToken, VerifyError};

/// Immutable auth configuration, fixed at startup
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Issuer and audience of access tokens
    pub domain: String,
    /// Shared HMAC secret for both tokens of a pair
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// A refresh token may only be exchanged once its remaining validity
    /// is at or below this threshold
    pub refresh_window: Duration,
}
