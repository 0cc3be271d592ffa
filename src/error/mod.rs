//! Centralized API error handling
//!
//! A unified error type for API responses with HTTP status code mapping and
//! JSON error bodies. Messages are written for clients: they never carry the
//! signing secret, raw tokens or claim contents.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::auth::{LoginError, RefreshError, SigningError, VerifyError};
use crate::repository::StoreError;

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 401 carrying the verification failure kind
    #[error("Unauthorized: {0}")]
    InvalidToken(#[from] VerifyError),

    #[error("Too early: {0}")]
    TooEarly(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

/// 425 Too Early
pub fn too_early() -> StatusCode {
    StatusCode::from_u16(425).unwrap_or(StatusCode::BAD_REQUEST)
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::InvalidToken(e) => e.code(),
            ApiError::TooEarly(_) => "TOO_EARLY",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::TooEarly(_) => too_early(),
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                tracing::error!(error = %message, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %message, code = %error_code, "Client error occurred");
            }
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::BadRequest("user not found".to_string()),
            StoreError::Duplicate(_) => ApiError::BadRequest(err.to_string()),
            StoreError::Database(e) => ApiError::DatabaseError(e),
        }
    }
}

impl From<SigningError> for ApiError {
    fn from(err: SigningError) -> Self {
        tracing::error!(error = %err, "Token signing failed, check JWT_SECRET");
        ApiError::InternalError("could not issue tokens".to_string())
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            LoginError::Signing(e) => e.into(),
            LoginError::Store(e) => e.into(),
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::BadRequest(_) => ApiError::BadRequest(err.to_string()),
            RefreshError::TooEarly => ApiError::TooEarly(err.to_string()),
            RefreshError::Signing(e) => e.into(),
            RefreshError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

/// Result type alias using ApiError
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RefreshRejection;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidToken(VerifyError::ExpiredToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::TooEarly("x".to_string()).status_code().as_u16(), 425);
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_verify_error_codes_pass_through() {
        assert_eq!(
            ApiError::from(VerifyError::MissingHeader).error_code(),
            "MISSING_TOKEN"
        );
        assert_eq!(
            ApiError::from(VerifyError::WrongIssuer).error_code(),
            "WRONG_ISSUER"
        );
    }

    #[test]
    fn test_refresh_errors_map_to_400_and_425() {
        let expired = ApiError::from(RefreshError::BadRequest(RefreshRejection::Expired));
        assert_eq!(expired.status_code(), StatusCode::BAD_REQUEST);

        let early = ApiError::from(RefreshError::TooEarly);
        assert_eq!(early.status_code().as_u16(), 425);
    }

    #[test]
    fn test_store_outage_is_server_error() {
        let err = ApiError::from(StoreError::Database("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::from(StoreError::NotFound).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
