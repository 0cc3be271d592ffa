//! Postgres-backed user store

use axum::async_trait;
use sqlx::PgPool;

use super::{StoreError, UserStore};
use crate::models::{NewUser, UpdateUser, User};

/// User store over the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let users: Vec<User> = sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, password, is_admin, created_at, updated_at
            FROM users
            ORDER BY last_name
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, password, is_admin, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, first_name, last_name, email, password, is_admin, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (first_name, last_name, email, password, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(new_user.is_admin)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(id)
    }

    async fn update_user(&self, update: UpdateUser) -> Result<(), StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $1, last_name = $2, email = $3, is_admin = $4, updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.email)
        .bind(update.is_admin)
        .bind(update.id)
        .execute(&self.db_pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db_pool).await?;
        Ok(())
    }
}
