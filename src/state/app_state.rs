//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::{AuthService, TokenVerifier};
use crate::repository::UserStore;

use axum::extract::FromRef;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, users: Arc<dyn UserStore>) -> Self {
        Self {
            auth_service,
            users,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.clone()
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.auth_service.verifier()
    }
}

impl FromRef<AppState> for Arc<dyn UserStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.users.clone()
    }
}
