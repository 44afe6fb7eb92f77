//! HTTP handlers for the pull-tab API.
//!
//! Handlers stay thin: extract identity and input, call
//! [`PullTabService`](crate::service::PullTabService), and let
//! [`AppError`] shape failures into `{ "code", "message" }` bodies.

pub mod admin;
pub mod designs;
pub mod identity;
pub mod tickets;
pub mod wallet;

use crate::error::PullTabError;
use crate::service::ServiceError;
use pulltab_web::AppError;
use serde::Deserialize;

pub use identity::{AdminGuard, AdminToken, PlayerIdentity, ADMIN_TOKEN_HEADER, PLAYER_ID_HEADER};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?limit=&offset=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    /// Page size
    pub limit: Option<i64>,
    /// Rows to skip
    pub offset: Option<i64>,
}

impl Pagination {
    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset, never negative.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(domain) => domain_error(&domain),
            ServiceError::Database(db) if db.is_retryable() => {
                Self::unavailable("Database busy, retry the request").with_source(anyhow::Error::new(db))
            },
            ServiceError::Database(db) => {
                Self::internal("Database error").with_source(anyhow::Error::new(db))
            },
            ServiceError::Serialization(message) => {
                Self::internal("Failed to record event").with_source(anyhow::anyhow!(message))
            },
            ServiceError::Rng(message) => {
                Self::internal("Ticket generation unavailable").with_source(anyhow::anyhow!(message))
            },
        }
    }
}

fn domain_error(err: &PullTabError) -> AppError {
    let code = err.reason().to_ascii_uppercase();
    let message = err.to_string();

    match err {
        PullTabError::DesignNotFound(id) => AppError::not_found("Design", id).with_code(code),
        PullTabError::TicketNotFound(id) => AppError::not_found("Ticket", id).with_code(code),
        PullTabError::InsufficientBalance { .. } => AppError::payment_required(message),
        PullTabError::TabIndexOutOfRange { .. }
        | PullTabError::InvalidDesign(_)
        | PullTabError::InvalidAmount => AppError::validation(message).with_code(code),
        PullTabError::TamperedTabs(_) => AppError::internal("Ticket failed integrity check")
            .with_code(code)
            .with_source(anyhow::anyhow!(message)),
        PullTabError::DesignInactive(_)
        | PullTabError::TicketAlreadyExists(_)
        | PullTabError::TabAlreadyRevealed(_)
        | PullTabError::NothingToReveal(_)
        | PullTabError::AlreadyClaimed(_)
        | PullTabError::TicketExpired(_)
        | PullTabError::NotYetExpired(_)
        | PullTabError::NoPrize(_)
        | PullTabError::PrizeNotRevealed(_)
        | PullTabError::BalanceOverflow => AppError::conflict(message).with_code(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coins, TicketId};
    use axum::http::StatusCode;
    use pulltab_postgres::DatabaseError;

    fn status_of(err: PullTabError) -> (StatusCode, String) {
        let app = AppError::from(ServiceError::Domain(err));
        (app.status(), app.code().to_string())
    }

    #[test]
    fn test_domain_status_mapping() {
        assert_eq!(
            status_of(PullTabError::TicketNotFound(TicketId::new())).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PullTabError::InsufficientBalance {
                balance: Coins::new(1),
                cost: Coins::new(5),
            }),
            (StatusCode::PAYMENT_REQUIRED, "INSUFFICIENT_BALANCE".to_string())
        );
        assert_eq!(
            status_of(PullTabError::AlreadyClaimed(TicketId::new())),
            (StatusCode::CONFLICT, "ALREADY_CLAIMED".to_string())
        );
        assert_eq!(
            status_of(PullTabError::TabIndexOutOfRange { index: 9, tab_count: 3 }).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PullTabError::TamperedTabs("two winners".into())).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_error_is_internal() {
        let app = AppError::from(ServiceError::Database(DatabaseError::Query("boom".into())));
        assert_eq!(app.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(app.message(), "Database error");
    }

    #[test]
    fn test_pagination_clamps() {
        let page = Pagination { limit: Some(1_000), offset: Some(-4) };
        assert_eq!(page.limit(), MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
        assert_eq!(Pagination::default().limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(Pagination { limit: Some(0), offset: None }.limit(), 1);
    }
}
