//! Middleware for the API
//!
//! Bearer-token authentication.

pub mod auth;

pub use auth::{require_auth, AuthenticatedUser};
