//! User API handlers
//!
//! All of these sit behind [`crate::middleware::require_auth`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::AuthenticatedUser;
use crate::auth::hash_password;
use crate::error::ApiError;
use crate::models::{NewUser, UpdateUser, User};
use crate::repository::UserStore;

fn user_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::BadRequest("invalid user id".to_string()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// GET /users/ - List users
pub async fn all_users(
    State(users): State<Arc<dyn UserStore>>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(users.all_users().await?))
}

/// GET /users/:id - Get a user by ID
pub async fn get_user(
    State(users): State<Arc<dyn UserStore>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(path)?;
    Ok(Json(users.get_user(id).await?))
}

/// DELETE /users/:id - Delete a user
pub async fn delete_user(
    State(users): State<Arc<dyn UserStore>>,
    caller: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = user_id(path)?;
    users.delete_user(id).await?;
    tracing::info!(user_id = id, by = caller.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/ - Insert a user
pub async fn insert_user(
    State(users): State<Arc<dyn UserStore>>,
    caller: AuthenticatedUser,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let mut new_user = json_body(payload)?;
    new_user.validate()?;

    let password = std::mem::take(&mut new_user.password);
    new_user.password = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let id = users.insert_user(new_user).await?;
    tracing::info!(user_id = id, by = caller.user_id, "User created");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /users/ - Update a user
pub async fn update_user(
    State(users): State<Arc<dyn UserStore>>,
    caller: AuthenticatedUser,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let update = json_body(payload)?;
    update.validate()?;

    let id = update.id;
    users.update_user(update).await?;
    tracing::info!(user_id = id, by = caller.user_id, "User updated");

    Ok(StatusCode::NO_CONTENT)
}
