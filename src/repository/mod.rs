//! User persistence
//!
//! The auth subsystem reads principals through [`UserStore`]; the HTTP
//! user API writes through it as well.

use axum::async_trait;
use thiserror::Error;

use crate::models::{NewUser, UpdateUser, User};

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// User store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User not found")]
    NotFound,

    #[error("Email already registered: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(e.to_string()),
        }
    }
}

/// Relational user repository
///
/// `insert_user` expects `new_user.password` to already be a bcrypt hash.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn all_users(&self) -> Result<Vec<User>, StoreError>;

    async fn get_user(&self, id: i64) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    async fn insert_user(&self, new_user: NewUser) -> Result<i64, StoreError>;

    async fn update_user(&self, update: UpdateUser) -> Result<(), StoreError>;

    /// Deleting an absent user is not an error
    async fn delete_user(&self, id: i64) -> Result<(), StoreError>;

    async fn health(&self) -> Result<(), StoreError>;
}
