//! Route definitions

mod auth;
mod user;

use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub use auth::auth_routes;
pub use user::user_routes;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
    pub version: String,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.users.health().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    let status = if store == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        store,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the complete application router
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes())
        .merge(user_routes(state.clone()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(configure_cors()),
        )
}

/// Mirror the caller's origin so browsers may send credentials
fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
        ])
}
