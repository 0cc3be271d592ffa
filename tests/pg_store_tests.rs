//! Postgres user store tests

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use std::sync::Arc;

    use webapp_auth::auth::{
        hash_password_with_cost, AuthService, AuthSettings, BcryptVerifier, RefreshError,
    };
    use webapp_auth::db;
    use webapp_auth::models::{Credentials, NewUser, UpdateUser};
    use webapp_auth::repository::{PgUserStore, StoreError, UserStore};

    /// Helper to create a migrated test store
    async fn setup_test_store() -> PgUserStore {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/webapp_auth_test".to_string());

        let pool = db::create_pool(&database_url, 1)
            .await
            .expect("Failed to connect to test database");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        PgUserStore::new(pool)
    }

    fn unique_email(prefix: &str) -> String {
        format!(
            "{}-{}@example.com",
            prefix,
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        )
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_user_crud() {
        let store = setup_test_store().await;
        let email = unique_email("jack");

        let id = store
            .insert_user(NewUser {
                first_name: "Jack".to_string(),
                last_name: "Smith".to_string(),
                email: email.clone(),
                password: hash_password_with_cost("hunter2", 4).unwrap(),
                is_admin: false,
            })
            .await
            .unwrap();

        let user = store.get_user(id).await.unwrap();
        assert_eq!(user.email, email);
        assert_eq!(store.get_user_by_email(&email).await.unwrap().id, id);

        let duplicate = store
            .insert_user(NewUser {
                first_name: "Jack".to_string(),
                last_name: "Smith".to_string(),
                email: email.clone(),
                password: String::new(),
                is_admin: false,
            })
            .await;
        assert!(matches!(duplicate, Err(StoreError::Duplicate(_))));

        store
            .update_user(UpdateUser {
                id,
                first_name: "John".to_string(),
                last_name: "Smith".to_string(),
                email: email.clone(),
                is_admin: true,
            })
            .await
            .unwrap();
        let updated = store.get_user(id).await.unwrap();
        assert_eq!(updated.first_name, "John");
        assert!(updated.is_admin);

        store.delete_user(id).await.unwrap();
        assert!(matches!(store.get_user(id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_login_against_database() {
        let store = setup_test_store().await;
        let email = unique_email("admin");
        store
            .insert_user(NewUser {
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                email: email.clone(),
                password: hash_password_with_cost("secret", 4).unwrap(),
                is_admin: true,
            })
            .await
            .unwrap();

        let settings = AuthSettings {
            domain: "example.com".to_string(),
            secret: "test-secret-key".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::hours(24),
            refresh_window: Duration::seconds(30),
        };
        let service =
            AuthService::new(&settings, Arc::new(store), Arc::new(BcryptVerifier)).unwrap();

        let pair = service
            .login(&Credentials {
                email,
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(RefreshError::TooEarly)
        ));
    }
}
