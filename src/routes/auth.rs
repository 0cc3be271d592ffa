//! Authentication routes

use axum::{routing::post, Router};

use crate::handlers::auth;
use crate::state::AppState;

/// Login and refresh, both public
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", post(auth::authenticate))
        .route("/refresh-token", post(auth::refresh))
}
