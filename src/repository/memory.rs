//! In-process user store

use axum::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{StoreError, UserStore};
use crate::auth::{hash_password_with_cost, PasswordError};
use crate::models::{NewUser, UpdateUser, User};

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

/// User store kept in memory, for local runs and tests
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
    hash_cost: u32,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::with_hash_cost(bcrypt::DEFAULT_COST)
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// bcrypt cost used by [`MemoryUserStore::seed`]
    pub fn with_hash_cost(hash_cost: u32) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            hash_cost,
        }
    }

    /// Store with the default administrator (`admin@example.com` / `secret`)
    pub async fn with_default_admin() -> Result<Self, PasswordError> {
        let store = Self::new();
        store.seed_default_admin().await?;
        Ok(store)
    }

    pub async fn seed_default_admin(&self) -> Result<User, PasswordError> {
        self.seed("Admin", "User", "admin@example.com", "secret", true)
            .await
    }

    /// Add a user with a plaintext password, hashing it first
    pub async fn seed(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<User, PasswordError> {
        let hash = hash_password_with_cost(password, self.hash_cost)?;
        let mut inner = self.inner.write().await;
        let user = inner.add(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: hash,
            is_admin,
        });
        Ok(user)
    }

    /// Overwrite a stored user wholesale
    pub async fn replace(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }
}

impl Inner {
    fn add(&mut self, new_user: NewUser) -> User {
        self.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: self.next_id,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password: new_user.password,
            is_admin: new_user.is_admin,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(user.id, user.clone());
        user
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<User, StoreError> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_user(&self, new_user: NewUser) -> Result<i64, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == new_user.email) {
            return Err(StoreError::Duplicate(new_user.email));
        }
        Ok(inner.add(new_user).id)
    }

    async fn update_user(&self, update: UpdateUser) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&update.id).ok_or(StoreError::NotFound)?;
        user.first_name = update.first_name;
        user.last_name = update.last_name;
        user.email = update.email;
        user.is_admin = update.is_admin;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        self.inner.write().await.users.remove(&id);
        Ok(())
    }

    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Jack".to_string(),
            last_name: "Smith".to_string(),
            email: email.to_string(),
            password: "hash".to_string(),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_default_admin_has_id_one() {
        let store = MemoryUserStore::with_hash_cost(4);
        store.seed_default_admin().await.unwrap();
        let admin = store.get_user_by_email("admin@example.com").await.unwrap();
        assert_eq!(admin.id, 1);
        assert!(admin.is_admin);
        assert_ne!(admin.password, "secret");
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let store = MemoryUserStore::new();
        let id = store.insert_user(new_user("jack@example.com")).await.unwrap();

        assert_eq!(store.get_user(id).await.unwrap().email, "jack@example.com");
        assert!(matches!(
            store.insert_user(new_user("jack@example.com")).await,
            Err(StoreError::Duplicate(_))
        ));

        store.delete_user(id).await.unwrap();
        assert!(matches!(store.get_user(id).await, Err(StoreError::NotFound)));
        store.delete_user(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = MemoryUserStore::new();
        let update = UpdateUser {
            id: 2,
            first_name: "Administrator".to_string(),
            last_name: "User".to_string(),
            email: "admin@example.com".to_string(),
            is_admin: true,
        };
        assert!(matches!(
            store.update_user(update).await,
            Err(StoreError::NotFound)
        ));
    }
}
