//! Refresh token exchange
//!
//! A presented refresh token moves through these checks, first failure wins:
//!
//! 1. malformed or not HMAC-signed              -> `BadRequest(Malformed)`
//! 2. bad signature                             -> `BadRequest(InvalidSignature)`
//! 3. expired                                   -> `BadRequest(Expired)`
//! 4. claims beyond `sub`/`exp` (access token)  -> `BadRequest(Malformed)`
//! 5. remaining validity above the window       -> `TooEarly`
//! 6. subject no longer exists                  -> `BadRequest(UnknownSubject)`
//! 7. otherwise a brand-new pair is minted for the current user state.
//!
//! Nothing is recorded, so the same refresh token may be exchanged more than
//! once while it sits inside the window.

use chrono::{Duration, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::claims::{RefreshClaims, TokenPair};
use super::issuer::{SigningError, TokenIssuer};
use super::verifier::{TokenVerifier, VerifyError};
use crate::repository::{StoreError, UserStore};

/// Why a refresh request was answered with 400
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRejection {
    Malformed,
    InvalidSignature,
    /// The client has to log in again; waiting will not help
    Expired,
    UnknownSubject,
}

impl fmt::Display for RefreshRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            RefreshRejection::Malformed => "malformed refresh token",
            RefreshRejection::InvalidSignature => "invalid refresh token signature",
            RefreshRejection::Expired => "refresh token expired, log in again",
            RefreshRejection::UnknownSubject => "unknown user",
        };
        f.write_str(reason)
    }
}

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("{0}")]
    BadRequest(RefreshRejection),

    #[error("refresh token does not need to be renewed yet")]
    TooEarly,

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("user lookup failed: {0}")]
    Store(StoreError),
}

impl From<VerifyError> for RefreshError {
    fn from(e: VerifyError) -> Self {
        let rejection = match e {
            VerifyError::InvalidSignature => RefreshRejection::InvalidSignature,
            VerifyError::ExpiredToken => RefreshRejection::Expired,
            _ => RefreshRejection::Malformed,
        };
        RefreshError::BadRequest(rejection)
    }
}

/// Exchanges refresh tokens that are close to expiry for new pairs
#[derive(Clone)]
pub struct RefreshFlow {
    verifier: Arc<TokenVerifier>,
    issuer: Arc<TokenIssuer>,
    users: Arc<dyn UserStore>,
    window: Duration,
}

impl RefreshFlow {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        issuer: Arc<TokenIssuer>,
        users: Arc<dyn UserStore>,
        window: Duration,
    ) -> Self {
        Self {
            verifier,
            issuer,
            users,
            window,
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, RefreshError> {
        let claims: RefreshClaims = self.verifier.decode_signed(refresh_token)?;

        let remaining = claims.exp - Utc::now().timestamp();
        if remaining > self.window.num_seconds() {
            return Err(RefreshError::TooEarly);
        }

        let user_id = claims
            .user_id()
            .ok_or(RefreshError::BadRequest(RefreshRejection::Malformed))?;

        let user = match self.users.get_user(user_id).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                return Err(RefreshError::BadRequest(RefreshRejection::UnknownSubject))
            }
            Err(e) => return Err(RefreshError::Store(e)),
        };

        let pair = self.issuer.issue(&user)?;
        tracing::info!(user_id = user.id, "Refreshed token pair");

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthSettings;
    use crate::models::User;
    use crate::repository::MemoryUserStore;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key";

    fn settings(refresh_ttl: Duration, refresh_window: Duration) -> AuthSettings {
        AuthSettings {
            domain: "example.com".to_string(),
            secret: SECRET.to_string(),
            access_ttl: Duration::seconds(1),
            refresh_ttl,
            refresh_window,
        }
    }

    async fn flow_with_user(settings: &AuthSettings) -> (RefreshFlow, User, Arc<MemoryUserStore>) {
        let store = Arc::new(MemoryUserStore::with_hash_cost(4));
        let user = store
            .seed("Admin", "User", "admin@example.com", "secret", false)
            .await
            .unwrap();
        let flow = RefreshFlow::new(
            Arc::new(TokenVerifier::new(settings)),
            Arc::new(TokenIssuer::new(settings).unwrap()),
            store.clone(),
            settings.refresh_window,
        );
        (flow, user, store)
    }

    fn signed_refresh(sub: &str, exp_offset: Duration, secret: &str) -> String {
        let claims = RefreshClaims {
            sub: sub.to_string(),
            exp: (Utc::now() + exp_offset).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_refresh_within_window_issues_new_pair() {
        let settings = settings(Duration::seconds(10), Duration::seconds(30));
        let (flow, user, _) = flow_with_user(&settings).await;
        let pair = TokenIssuer::new(&settings).unwrap().issue(&user).unwrap();

        let renewed = flow.refresh(&pair.refresh_token).await.unwrap();
        let claims = TokenVerifier::new(&settings)
            .verify_access_token(&renewed.access_token)
            .unwrap();
        assert_eq!(claims.user_id(), Some(user.id));
    }

    #[tokio::test]
    async fn test_refresh_reflects_current_user_state() {
        let settings = settings(Duration::seconds(10), Duration::seconds(30));
        let (flow, user, store) = flow_with_user(&settings).await;
        let pair = TokenIssuer::new(&settings).unwrap().issue(&user).unwrap();

        let mut promoted = user.clone();
        promoted.first_name = "Administrator".to_string();
        promoted.is_admin = true;
        store.replace(promoted).await;

        let renewed = flow.refresh(&pair.refresh_token).await.unwrap();
        let claims = TokenVerifier::new(&settings)
            .verify_access_token(&renewed.access_token)
            .unwrap();
        assert_eq!(claims.name, "Administrator User");
        assert!(claims.admin);
    }

    #[tokio::test]
    async fn test_refresh_outside_window_is_too_early() {
        let settings = settings(Duration::hours(24), Duration::seconds(30));
        let (flow, user, _) = flow_with_user(&settings).await;
        let pair = TokenIssuer::new(&settings).unwrap().issue(&user).unwrap();

        assert!(matches!(
            flow.refresh(&pair.refresh_token).await,
            Err(RefreshError::TooEarly)
        ));
    }

    #[tokio::test]
    async fn test_expired_refresh_is_bad_request_not_too_early() {
        let settings = settings(Duration::hours(24), Duration::seconds(30));
        let (flow, _, _) = flow_with_user(&settings).await;
        let token = signed_refresh("1", Duration::minutes(-5), SECRET);

        assert!(matches!(
            flow.refresh(&token).await,
            Err(RefreshError::BadRequest(RefreshRejection::Expired))
        ));
    }

    #[tokio::test]
    async fn test_access_token_is_not_a_refresh_token() {
        let mut settings = settings(Duration::seconds(60), Duration::seconds(30));
        settings.access_ttl = Duration::seconds(20);
        let (flow, user, _) = flow_with_user(&settings).await;
        let pair = TokenIssuer::new(&settings).unwrap().issue(&user).unwrap();

        // inside the window and unexpired, but shaped like an access token
        assert!(matches!(
            flow.refresh(&pair.access_token).await,
            Err(RefreshError::BadRequest(RefreshRejection::Malformed))
        ));
    }

    #[tokio::test]
    async fn test_bad_signature_and_garbage() {
        let settings = settings(Duration::hours(24), Duration::seconds(30));
        let (flow, _, _) = flow_with_user(&settings).await;

        let forged = signed_refresh("1", Duration::seconds(10), "other-secret");
        assert!(matches!(
            flow.refresh(&forged).await,
            Err(RefreshError::BadRequest(RefreshRejection::InvalidSignature))
        ));

        for garbage in ["", "garbage", "a.b.c"] {
            assert!(matches!(
                flow.refresh(garbage).await,
                Err(RefreshError::BadRequest(RefreshRejection::Malformed))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_or_non_numeric_subject() {
        let settings = settings(Duration::hours(24), Duration::seconds(30));
        let (flow, _, _) = flow_with_user(&settings).await;

        let unknown = signed_refresh("42", Duration::seconds(10), SECRET);
        assert!(matches!(
            flow.refresh(&unknown).await,
            Err(RefreshError::BadRequest(RefreshRejection::UnknownSubject))
        ));

        let non_numeric = signed_refresh("admin", Duration::seconds(10), SECRET);
        assert!(matches!(
            flow.refresh(&non_numeric).await,
            Err(RefreshError::BadRequest(RefreshRejection::Malformed))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_both_succeed() {
        let settings = settings(Duration::seconds(10), Duration::seconds(30));
        let (flow, user, _) = flow_with_user(&settings).await;
        let pair = TokenIssuer::new(&settings).unwrap().issue(&user).unwrap();

        let (a, b) = tokio::join!(
            flow.refresh(&pair.refresh_token),
            flow.refresh(&pair.refresh_token)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
    }
}
