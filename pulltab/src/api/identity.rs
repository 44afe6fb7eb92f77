//! Request identity extractors.
//!
//! Players are identified by the `X-Player-Id` header. Admin routes compare
//! `X-Admin-Token` against the configured token; when no token is configured
//! every admin request is refused.

use crate::types::PlayerId;
use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use pulltab_web::{header_uuid, AppError};
use std::sync::Arc;

/// Header carrying the calling player's id.
pub const PLAYER_ID_HEADER: &str = "X-Player-Id";

/// Header carrying the admin shared secret.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// The player making the request.
#[derive(Debug, Clone, Copy)]
pub struct PlayerIdentity(pub PlayerId);

#[async_trait]
impl<S> FromRequestParts<S> for PlayerIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_uuid(&parts.headers, PLAYER_ID_HEADER)?
            .map(|id| Self(PlayerId::from_uuid(id)))
            .ok_or_else(|| AppError::unauthorized(format!("Missing {PLAYER_ID_HEADER} header")))
    }
}

/// Configured admin secret, `None` when admin routes are closed.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(Option<Arc<str>>);

impl AdminToken {
    /// Wrap the configured token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self(token.map(Arc::from))
    }

    fn accepts(&self, presented: &str) -> bool {
        self.0
            .as_deref()
            .is_some_and(|expected| {
                constant_time_eq::constant_time_eq(expected.as_bytes(), presented.as_bytes())
            })
    }
}

/// Proof that the request carried the admin token.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[async_trait]
impl<S> FromRequestParts<S> for AdminGuard
where
    S: Send + Sync,
    AdminToken: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = AdminToken::from_ref(state);
        let presented = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if token.accepts(presented) {
            Ok(Self)
        } else {
            tracing::warn!(path = %parts.uri.path(), "Rejected admin request");
            Err(AppError::forbidden("Admin token required"))
        }
    }
}
