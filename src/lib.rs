//! Token-authenticated user API
//!
//! Issues paired access/refresh JWTs on login, guards the user API with
//! bearer-token verification and exchanges near-expiry refresh tokens for
//! new pairs.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use routes::app_router;
pub use state::AppState;
