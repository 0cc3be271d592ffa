//! Authentication HTTP handlers

use axum::{
    extract::{rejection::FormRejection, rejection::JsonRejection, State},
    Form, Json,
};
use validator::Validate;

use crate::auth::TokenPair;
use crate::error::ApiError;
use crate::models::{Credentials, RefreshTokenRequest};
use crate::state::AppState;

/// POST /auth - Exchange email and password for a token pair
///
/// Every credential problem, including an unreadable body, answers 401
/// with the same message.
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let invalid = || ApiError::Unauthorized("invalid credentials".to_string());

    let Json(credentials) = payload.map_err(|_| invalid())?;
    credentials.validate().map_err(|_| invalid())?;

    let tokens = state.auth_service.login(&credentials).await?;

    Ok(Json(tokens))
}

/// POST /refresh-token - Exchange a refresh token for a new pair
pub async fn refresh(
    State(state): State<AppState>,
    form: Result<Form<RefreshTokenRequest>, FormRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Form(req) = form.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let tokens = state
        .auth_service
        .refresh(&req.refresh_token)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Refresh rejected");
            ApiError::from(e)
        })?;

    Ok(Json(tokens))
}
