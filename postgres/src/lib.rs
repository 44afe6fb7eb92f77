//! `PostgreSQL` plumbing for the pull-tab engine.
//!
//! This crate owns the pieces every `PostgreSQL`-backed component needs and
//! nothing domain specific:
//!
//! - Pool construction from [`PostgresConfig`]
//! - Liveness probing for readiness checks
//! - Mapping `sqlx` failures into [`DatabaseError`], with constraint and
//!   concurrency failures kept distinguishable from plain I/O errors
//!
//! Queries and migrations live next to the domain that owns them.
//!
//! # Example
//!
//! ```ignore
//! use pulltab_postgres::{connect, PostgresConfig};
//!
//! let pool = connect(&PostgresConfig::new("postgres://localhost/pulltab")).await?;
//! pulltab_postgres::ping(&pool).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;

/// SQLSTATE for `serialization_failure`.
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE for `deadlock_detected`.
const DEADLOCK_DETECTED: &str = "40P01";

/// `PostgreSQL` connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Idle timeout in seconds (connections idle longer than this are closed)
    pub idle_timeout: u64,
}

impl PostgresConfig {
    /// Settings for `url` with the default pool sizing.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout: 30,
            idle_timeout: 600,
        }
    }
}

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Could not establish a connection
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// A constraint (unique, check, foreign key) rejected the write
    #[error("Constraint `{constraint}` violated: {message}")]
    Constraint {
        /// Name of the violated constraint
        constraint: String,
        /// Database error message
        message: String,
    },

    /// The transaction lost a race (serialization failure or deadlock)
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),

    /// A stored value could not be decoded into the domain type
    #[error("Failed to decode column `{column}`: {message}")]
    Decode {
        /// Column that failed to decode
        column: String,
        /// What was wrong with it
        message: String,
    },

    /// Migrations failed to apply
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Any other query failure
    #[error("Query failed: {0}")]
    Query(String),
}

impl DatabaseError {
    /// Build a decode error for `column`.
    #[must_use]
    pub fn decode(column: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.to_string(),
        }
    }

    /// Returns true if retrying the whole transaction could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                if matches!(code.as_deref(), Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED)) {
                    return Self::Conflict(db_err.message().to_string());
                }
                if let Some(constraint) = db_err.constraint() {
                    return Self::Constraint {
                        constraint: constraint.to_string(),
                        message: db_err.message().to_string(),
                    };
                }
                Self::Query(err.to_string())
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Connection(err.to_string())
            },
            sqlx::Error::ColumnDecode { index, source } => Self::decode(index.clone(), source),
            _ => Self::Query(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

/// Build a connection pool from `config`.
///
/// # Errors
///
/// Returns [`DatabaseError::Connection`] if the first connection cannot be
/// established within the configured timeout.
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, DatabaseError> {
    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connecting to PostgreSQL"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout))
        .idle_timeout(Duration::from_secs(config.idle_timeout))
        .connect(&config.url)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))
}

/// Run a trivial query to verify the pool can reach the database.
///
/// # Errors
///
/// Returns the mapped `sqlx` error if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PostgresConfig::new("postgres://localhost/pulltab");
        assert_eq!(config.url, "postgres://localhost/pulltab");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
    }

    #[test]
    fn test_pool_timeout_maps_to_connection() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::Connection(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_query() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[test]
    fn test_conflict_is_retryable() {
        assert!(DatabaseError::Conflict("deadlock".to_string()).is_retryable());
    }

    #[test]
    fn test_decode_display() {
        let err = DatabaseError::decode("tabs", "expected array");
        assert_eq!(err.to_string(), "Failed to decode column `tabs`: expected array");
    }
}
