//! HTTP server for the pull-tab engine.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Database readiness probe
//! - Router configuration

pub mod health;
pub mod routes;
pub mod state;

pub use health::PgProbe;
pub use routes::build_router;
pub use state::AppState;
