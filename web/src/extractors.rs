//! Custom Axum extractors.
//!
//! - [`AppJson`], [`AppPath`], [`AppQuery`]: Axum's `Json`, `Path` and `Query`
//!   with rejections turned into [`AppError`], so malformed input gets the
//!   same JSON error body as every other failure
//! - [`header_uuid`]: parse an optional UUID header, for identity extractors
//!   defined by applications
//!
//! # Examples
//!
//! ```ignore
//! use pulltab_web::{AppJson, AppPath};
//!
//! async fn reveal(
//!     AppPath(ticket_id): AppPath<Uuid>,
//!     AppJson(body): AppJson<RevealRequest>,
//! ) -> Result<Json<TicketView>, AppError> {
//!     // ...
//! }
//! ```

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// JSON request body whose rejection is an [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters whose rejection is an [`AppError`].
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string whose rejection is an [`AppError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Parse a UUID-valued header.
///
/// Returns `Ok(None)` when the header is absent.
///
/// # Errors
///
/// Returns a 400 [`AppError`] when the header is present but is not a
/// valid UUID.
pub fn header_uuid(headers: &HeaderMap, name: &str) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::bad_request(format!("Header {name} must be a UUID")))
}
