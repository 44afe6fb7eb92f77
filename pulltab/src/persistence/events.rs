//! `pull_tab_ticket_events` queries: the append-only audit log.

use crate::types::TicketId;
use chrono::{DateTime, Utc};
use pulltab_postgres::DatabaseError;
use serde::Serialize;
use sqlx::types::JsonValue;
use sqlx::PgExecutor;

/// A recorded ticket event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AuditEvent {
    /// Sequence number
    pub id: i64,
    /// Ticket the event belongs to
    pub ticket_id: TicketId,
    /// Versioned event name, e.g. `TabRevealed.v1`
    pub event_type: String,
    /// The event as JSON
    pub payload: JsonValue,
    /// When it was written
    pub recorded_at: DateTime<Utc>,
}

/// Append one event.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the insert fails.
pub async fn append<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: TicketId,
    event_type: &str,
    payload: &JsonValue,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO pull_tab_ticket_events (ticket_id, event_type, payload)
         VALUES ($1, $2, $3)",
    )
    .bind(ticket_id.as_uuid())
    .bind(event_type)
    .bind(payload)
    .execute(executor)
    .await?;

    Ok(())
}

/// Every event of a ticket, in the order it was written.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails.
pub async fn list_for_ticket<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket_id: TicketId,
) -> Result<Vec<AuditEvent>, DatabaseError> {
    let rows: Vec<(i64, String, JsonValue, DateTime<Utc>)> = sqlx::query_as(
        "SELECT id, event_type, payload, recorded_at
         FROM pull_tab_ticket_events
         WHERE ticket_id = $1
         ORDER BY id",
    )
    .bind(ticket_id.as_uuid())
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, event_type, payload, recorded_at)| AuditEvent {
            id,
            ticket_id,
            event_type,
            payload,
            recorded_at,
        })
        .collect())
}
