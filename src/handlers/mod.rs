//! API handlers

pub mod auth;
pub mod user;

pub use auth::{authenticate, refresh};
pub use user::{all_users, delete_user, get_user, insert_user, update_user};

// Re-export AuthenticatedUser from middleware for handler use
pub use crate::middleware::auth::AuthenticatedUser;
