//! Axum integration for the pull-tab engine.
//!
//! This crate is the imperative shell's HTTP edge: it turns domain failures
//! into JSON error responses and gives every request a correlation ID and a
//! tracing span. Routing and domain-specific extractors live in the
//! application crate.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract data** from request ([`AppJson`], [`AppPath`], identity headers)
//! 3. **Call the service**, which reduces a command inside a transaction
//! 4. **Map result** to an HTTP response, or an [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use pulltab_web::{AppError, correlation_id_layer};
//! use axum::{Router, routing::post, Json};
//!
//! async fn claim(
//!     State(state): State<AppState>,
//!     AppPath(ticket_id): AppPath<Uuid>,
//! ) -> Result<Json<TicketView>, AppError> {
//!     let view = state.service.claim(player, TicketId::from_uuid(ticket_id)).await?;
//!     Ok(Json(view))
//! }
//!
//! let app = Router::new()
//!     .route("/api/tickets/:id/claim", post(claim))
//!     .layer(correlation_id_layer())
//!     .with_state(app_state);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{header_uuid, AppJson, AppPath, AppQuery};
pub use handlers::{health_check, readiness_check, ReadinessProbe};
pub use middleware::{correlation_id_layer, CORRELATION_ID_HEADER};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
