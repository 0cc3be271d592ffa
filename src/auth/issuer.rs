//! Token pair minting

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use thiserror::Error;

use super::claims::{AccessClaims, RefreshClaims, TokenPair};
use super::AuthSettings;
use crate::models::User;

/// Signing failures. These point at a misconfigured deployment, not at the
/// caller, and are never retried.
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Signing secret is empty")]
    EmptySecret,

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Token lifetime out of range")]
    ExpiryOutOfRange,
}

/// Mints signed access/refresh token pairs
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    domain: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(settings: &AuthSettings) -> Result<Self, SigningError> {
        if settings.secret.is_empty() {
            return Err(SigningError::EmptySecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            domain: settings.domain.clone(),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        })
    }

    /// Issue a fresh token pair for a user
    pub fn issue(&self, user: &User) -> Result<TokenPair, SigningError> {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, SigningError> {
        let expires = |ttl: Duration| {
            now.checked_add_signed(ttl)
                .map(|t| t.timestamp())
                .ok_or(SigningError::ExpiryOutOfRange)
        };

        let access = AccessClaims {
            sub: user.id.to_string(),
            name: user.full_name(),
            aud: self.domain.clone(),
            iss: self.domain.clone(),
            admin: user.is_admin,
            exp: expires(self.access_ttl)?,
        };

        let refresh = RefreshClaims {
            sub: user.id.to_string(),
            exp: expires(self.refresh_ttl)?,
        };

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, SigningError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| SigningError::EncodingFailed(e.to_string()))
    }
}
