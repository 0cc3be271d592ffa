//! Authentication service
//!
//! Ties the token issuer, verifier and refresh flow to the user store and
//! the credential verifier. Holds no mutable state.

use std::sync::Arc;
use thiserror::Error;

use super::claims::TokenPair;
use super::issuer::{SigningError, TokenIssuer};
use super::password::CredentialVerifier;
use super::refresh::{RefreshError, RefreshFlow};
use super::verifier::TokenVerifier;
use super::AuthSettings;
use crate::models::Credentials;
use crate::repository::{StoreError, UserStore};

/// Login errors
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("user lookup failed: {0}")]
    Store(StoreError),
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    refresh_flow: RefreshFlow,
    users: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialVerifier>,
}

impl AuthService {
    /// Build the service; fails only on an unusable signing secret
    pub fn new(
        settings: &AuthSettings,
        users: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, SigningError> {
        let issuer = Arc::new(TokenIssuer::new(settings)?);
        let verifier = Arc::new(TokenVerifier::new(settings));
        let refresh_flow = RefreshFlow::new(
            verifier.clone(),
            issuer.clone(),
            users.clone(),
            settings.refresh_window,
        );

        Ok(Self {
            issuer,
            verifier,
            refresh_flow,
            users,
            credentials,
        })
    }

    /// Check credentials and issue a token pair
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, LoginError> {
        let user = match self.users.get_user_by_email(&credentials.email).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(LoginError::InvalidCredentials),
            Err(e) => return Err(LoginError::Store(e)),
        };

        // bcrypt is CPU-bound
        let verifier = self.credentials.clone();
        let password = credentials.password.clone();
        let stored_hash = user.password.clone();
        let matches =
            tokio::task::spawn_blocking(move || verifier.verify(&password, &stored_hash)).await;

        match matches {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => return Err(LoginError::InvalidCredentials),
            Ok(Err(e)) => {
                tracing::warn!(user_id = user.id, error = %e, "Stored password hash unusable");
                return Err(LoginError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                return Err(LoginError::InvalidCredentials);
            }
        }

        let pair = self.issuer.issue(&user)?;
        tracing::info!(user_id = user.id, "User logged in");

        Ok(pair)
    }

    /// Exchange a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        self.refresh_flow.refresh(refresh_token).await
    }

    /// Verifier shared with the auth middleware
    pub fn verifier(&self) -> Arc<TokenVerifier> {
        self.verifier.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::BcryptVerifier;
    use crate::repository::MemoryUserStore;
    use chrono::Duration;

    fn settings() -> AuthSettings {
        AuthSettings {
            domain: "example.com".to_string(),
            secret: "test-secret-key".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::hours(24),
            refresh_window: Duration::seconds(30),
        }
    }

    async fn service() -> AuthService {
        let store = Arc::new(MemoryUserStore::with_hash_cost(4));
        store
            .seed("Admin", "User", "admin@example.com", "secret", true)
            .await
            .unwrap();
        AuthService::new(&settings(), store, Arc::new(BcryptVerifier)).unwrap()
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_pair() {
        let service = service().await;
        let pair = service
            .login(&credentials("admin@example.com", "secret"))
            .await
            .unwrap();

        let claims = service
            .verifier()
            .verify_access_token(&pair.access_token)
            .unwrap();
        assert_eq!(claims.sub, "1");
        assert_eq!(claims.name, "Admin User");
        assert!(claims.admin);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let service = service().await;
        assert!(matches!(
            service.login(&credentials("admin@example.com", "wrong")).await,
            Err(LoginError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login(&credentials("admin@nothere.com", "secret")).await,
            Err(LoginError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_fresh_login_refresh_token_is_too_early() {
        let service = service().await;
        let pair = service
            .login(&credentials("admin@example.com", "secret"))
            .await
            .unwrap();

        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(RefreshError::TooEarly)
        ));
    }
}
