//! `PostgreSQL` access for designs, wallets, tickets, the ledger and the
//! ticket audit log.
//!
//! Every function takes an executor, so the same query runs against the pool
//! for reads and against an open transaction for writes. Row locks
//! (`SELECT ... FOR UPDATE`) are only meaningful inside a transaction.
//!
//! Lock order is always wallet first, then ticket.

pub mod designs;
pub mod events;
pub mod ledger;
pub mod tickets;
pub mod wallets;

use crate::types::Coins;
use pulltab_postgres::DatabaseError;
use sqlx::migrate::Migrator;
use sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns [`DatabaseError::Migration`] if a migration fails or the recorded
/// history does not match the embedded files.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Decode a `BIGINT` amount column.
fn coins(column: &str, value: i64) -> Result<Coins, DatabaseError> {
    Coins::from_i64(value).ok_or_else(|| DatabaseError::decode(column, format!("negative amount {value}")))
}

/// Encode an amount for a `BIGINT` column.
fn bigint(column: &str, value: Coins) -> Result<i64, DatabaseError> {
    value
        .to_i64()
        .map_err(|_| DatabaseError::Query(format!("{column} value {value} exceeds BIGINT range")))
}

/// Decode an `INTEGER` count column.
fn count(column: &str, value: i32) -> Result<usize, DatabaseError> {
    usize::try_from(value).map_err(|e| DatabaseError::decode(column, e))
}
