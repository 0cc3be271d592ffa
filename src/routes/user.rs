//! User route definitions

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::handlers::user::{all_users, delete_user, get_user, insert_user, update_user};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Protected user API
pub fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users/",
            get(all_users).put(insert_user).patch(update_user),
        )
        .route("/users/:id", get(get_user).delete(delete_user))
        .route_layer(from_fn_with_state(state, require_auth))
}
