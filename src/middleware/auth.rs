//! Authentication middleware
//!
//! [`require_auth`] gates a router on a valid bearer access token and hands
//! the verified principal to handlers as an [`AuthenticatedUser`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{TokenVerifier, VerifiedToken, VerifyError};
use crate::error::ApiError;

/// Principal attached to requests that passed [`require_auth`]
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub name: String,
    pub is_admin: bool,
}

impl TryFrom<VerifiedToken> for AuthenticatedUser {
    type Error = VerifyError;

    fn try_from(verified: VerifiedToken) -> Result<Self, Self::Error> {
        let user_id = verified
            .claims
            .user_id()
            .ok_or(VerifyError::MalformedToken)?;

        Ok(Self {
            user_id,
            name: verified.claims.name,
            is_admin: verified.claims.admin,
        })
    }
}

/// Reject requests without a valid access token
///
/// Every response passing through here, accepted or not, carries
/// `Vary: Authorization`.
///
/// ```rust,ignore
/// Router::new()
///     .route("/users/", get(all_users))
///     .route_layer(from_fn_with_state(state.clone(), require_auth))
/// ```
pub async fn require_auth(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = verifier
        .verify_headers(request.headers())
        .and_then(AuthenticatedUser::try_from);

    let mut response = match outcome {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                code = e.code(),
                path = %request.uri().path(),
                "Rejected bearer token"
            );
            ApiError::from(e).into_response()
        }
    };

    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Authorization"));
    response
}

/// Extractor for the principal set by [`require_auth`]
///
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> impl IntoResponse {
///     format!("Hello, user {}", user.user_id)
/// }
/// ```
#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(ApiError::InvalidToken(VerifyError::MissingHeader))
    }
}
