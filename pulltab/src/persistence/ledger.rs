//! `ledger_entries` queries.

use super::coins;
use crate::types::{LedgerEntry, LedgerKind, NewLedgerEntry, PlayerId, TicketId};
use chrono::{DateTime, Utc};
use pulltab_postgres::DatabaseError;
use sqlx::PgExecutor;
use uuid::Uuid;

/// Record a balance movement and return its sequence number.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the insert fails.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    entry: &NewLedgerEntry,
) -> Result<i64, DatabaseError> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO ledger_entries (player_id, ticket_id, kind, amount, balance_after, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id",
    )
    .bind(entry.player_id.as_uuid())
    .bind(entry.ticket_id.map(|id| *id.as_uuid()))
    .bind(entry.kind.as_str())
    .bind(entry.amount)
    .bind(super::bigint("balance_after", entry.balance_after)?)
    .bind(entry.created_at)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

/// A player's ledger, newest first.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or a row cannot be decoded.
pub async fn list_for_player<'e, E: PgExecutor<'e>>(
    executor: E,
    player_id: PlayerId,
    limit: i64,
    offset: i64,
) -> Result<Vec<LedgerEntry>, DatabaseError> {
    let rows: Vec<(i64, Option<Uuid>, String, i64, i64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, ticket_id, kind, amount, balance_after, created_at
         FROM ledger_entries
         WHERE player_id = $1
         ORDER BY id DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(player_id.as_uuid())
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    rows.into_iter()
        .map(|(id, ticket_id, kind, amount, balance_after, created_at)| {
            Ok(LedgerEntry {
                id,
                player_id,
                ticket_id: ticket_id.map(TicketId::from_uuid),
                kind: LedgerKind::parse(&kind)
                    .ok_or_else(|| DatabaseError::decode("kind", format!("unknown kind {kind}")))?,
                amount,
                balance_after: coins("balance_after", balance_after)?,
                created_at,
            })
        })
        .collect()
}
