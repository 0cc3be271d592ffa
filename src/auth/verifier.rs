//! Bearer token verification
//!
//! Parses the `Authorization` header, pins the declared algorithm to the
//! HMAC family, checks signature and expiry, then checks that the token was
//! issued for this deployment's domain.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use super::claims::AccessClaims;
use super::AuthSettings;

/// Verification failures, each answered with 401 on protected routes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Authorization header required")]
    MissingHeader,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,

    #[error("Token is not a valid JWT")]
    MalformedToken,

    #[error("Unexpected signing algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token was not issued by this service")]
    WrongIssuer,
}

impl VerifyError {
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::MissingHeader => "MISSING_TOKEN",
            VerifyError::MalformedHeader => "MALFORMED_HEADER",
            VerifyError::MalformedToken => "MALFORMED_TOKEN",
            VerifyError::UnexpectedAlgorithm(_) => "UNEXPECTED_ALGORITHM",
            VerifyError::InvalidSignature => "INVALID_SIGNATURE",
            VerifyError::ExpiredToken => "TOKEN_EXPIRED",
            VerifyError::WrongIssuer => "WRONG_ISSUER",
        }
    }
}

/// A verified bearer token and its claims
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    /// The raw token, unchanged
    pub token: String,
    pub claims: AccessClaims,
}

#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

/// Verifies bearer tokens against the shared secret and domain
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    domain: String,
}

impl TokenVerifier {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            domain: settings.domain.clone(),
        }
    }

    /// Verify the `Authorization` header of a request
    ///
    /// Callers must add `Vary: Authorization` to the response whatever the
    /// outcome; [`crate::middleware::require_auth`] does.
    pub fn verify_headers(&self, headers: &HeaderMap) -> Result<VerifiedToken, VerifyError> {
        match headers.get(header::AUTHORIZATION) {
            None => self.verify(None),
            Some(value) => {
                let value = value.to_str().map_err(|_| VerifyError::MalformedHeader)?;
                self.verify(Some(value))
            }
        }
    }

    /// Verify a raw `Authorization` header value
    pub fn verify(&self, header_value: Option<&str>) -> Result<VerifiedToken, VerifyError> {
        let token = bearer_token(header_value)?;
        let claims = self.verify_access_token(token)?;

        Ok(VerifiedToken {
            token: token.to_string(),
            claims,
        })
    }

    /// Verify an access token without the header wrapping
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, VerifyError> {
        let claims: AccessClaims = self.decode_signed(token)?;

        if claims.iss != self.domain || claims.aud != self.domain {
            return Err(VerifyError::WrongIssuer);
        }

        Ok(claims)
    }

    /// Algorithm pinning, signature and expiry checks shared by access and
    /// refresh tokens
    pub(crate) fn decode_signed<T: DeserializeOwned>(&self, token: &str) -> Result<T, VerifyError> {
        let algorithm = declared_algorithm(token)?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_aud = false;

        let token_data =
            decode::<T>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::ExpiredToken,
                ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => {
                    VerifyError::UnexpectedAlgorithm(format!("{:?}", algorithm))
                }
                _ => VerifyError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }
}

/// Split `Bearer <token>` into its token
fn bearer_token(header_value: Option<&str>) -> Result<&str, VerifyError> {
    let value = match header_value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(VerifyError::MissingHeader),
    };

    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(VerifyError::MalformedHeader);
    }

    Ok(parts[1])
}

/// Read the `alg` a token declares, accepting only the HMAC family
fn declared_algorithm(token: &str) -> Result<Algorithm, VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(VerifyError::MalformedToken);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|_| VerifyError::MalformedToken)?;
    let header: JoseHeader =
        serde_json::from_slice(&header_bytes).map_err(|_| VerifyError::MalformedToken)?;

    match header.alg.as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(VerifyError::UnexpectedAlgorithm(other.to_string())),
    }
}
