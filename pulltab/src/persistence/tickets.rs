//! `pull_tab_tickets` queries.

use super::{bigint, coins};
use crate::types::{
    ClaimStatus, DesignId, PlayerId, PullTabTicket, Tab, TicketId, TicketStatus,
};
use chrono::{DateTime, Utc};
use pulltab_postgres::DatabaseError;
use sqlx::types::Json;
use sqlx::PgExecutor;
use uuid::Uuid;

const COLUMNS: &str = "id, player_id, design_id, cost, tabs, status, claim_status, \
                       purchased_at, expires_at, claimed_at, expired_at";

#[derive(sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    player_id: Uuid,
    design_id: Uuid,
    cost: i64,
    tabs: Json<Vec<Tab>>,
    status: String,
    claim_status: String,
    purchased_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    claimed_at: Option<DateTime<Utc>>,
    expired_at: Option<DateTime<Utc>>,
}

impl TryFrom<TicketRow> for PullTabTicket {
    type Error = DatabaseError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let status = TicketStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::decode("status", format!("unknown status {}", row.status)))?;
        let claim_status = ClaimStatus::parse(&row.claim_status).ok_or_else(|| {
            DatabaseError::decode("claim_status", format!("unknown claim status {}", row.claim_status))
        })?;

        Ok(Self {
            id: TicketId::from_uuid(row.id),
            player_id: PlayerId::from_uuid(row.player_id),
            design_id: DesignId::from_uuid(row.design_id),
            cost: coins("cost", row.cost)?,
            tabs: row.tabs.0,
            status,
            claim_status,
            purchased_at: row.purchased_at,
            expires_at: row.expires_at,
            claimed_at: row.claimed_at,
            expired_at: row.expired_at,
        })
    }
}

/// Insert a freshly purchased ticket.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the insert fails.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket: &PullTabTicket,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO pull_tab_tickets
            (id, player_id, design_id, cost, tabs, status, claim_status,
             purchased_at, expires_at, claimed_at, expired_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(ticket.id.as_uuid())
    .bind(ticket.player_id.as_uuid())
    .bind(ticket.design_id.as_uuid())
    .bind(bigint("cost", ticket.cost)?)
    .bind(Json(&ticket.tabs))
    .bind(ticket.status.as_str())
    .bind(ticket.claim_status.as_str())
    .bind(ticket.purchased_at)
    .bind(ticket.expires_at)
    .bind(ticket.claimed_at)
    .bind(ticket.expired_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Write the mutable part of a ticket back.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the update fails.
pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    ticket: &PullTabTicket,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "UPDATE pull_tab_tickets
         SET tabs = $2, status = $3, claim_status = $4, claimed_at = $5, expired_at = $6
         WHERE id = $1",
    )
    .bind(ticket.id.as_uuid())
    .bind(Json(&ticket.tabs))
    .bind(ticket.status.as_str())
    .bind(ticket.claim_status.as_str())
    .bind(ticket.claimed_at)
    .bind(ticket.expired_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Load a ticket and lock its row for the rest of the transaction.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or the row cannot be decoded.
pub async fn lock<'e, E: PgExecutor<'e>>(
    executor: E,
    id: TicketId,
) -> Result<Option<PullTabTicket>, DatabaseError> {
    let row: Option<TicketRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pull_tab_tickets WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .fetch_optional(executor)
    .await?;

    row.map(PullTabTicket::try_from).transpose()
}

/// Load a ticket without locking it.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or the row cannot be decoded.
pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    id: TicketId,
) -> Result<Option<PullTabTicket>, DatabaseError> {
    let row: Option<TicketRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM pull_tab_tickets WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(executor)
            .await?;

    row.map(PullTabTicket::try_from).transpose()
}

/// A player's tickets, newest first.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or a row cannot be decoded.
pub async fn list_for_player<'e, E: PgExecutor<'e>>(
    executor: E,
    player_id: PlayerId,
    limit: i64,
    offset: i64,
) -> Result<Vec<PullTabTicket>, DatabaseError> {
    let rows: Vec<TicketRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pull_tab_tickets
         WHERE player_id = $1
         ORDER BY purchased_at DESC, id
         LIMIT $2 OFFSET $3"
    ))
    .bind(player_id.as_uuid())
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(PullTabTicket::try_from).collect()
}

/// Active tickets whose lifetime ended at or before `now`, oldest first.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails.
pub async fn due_for_expiry<'e, E: PgExecutor<'e>>(
    executor: E,
    now: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<(TicketId, PlayerId)>, DatabaseError> {
    let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
        "SELECT id, player_id FROM pull_tab_tickets
         WHERE status = 'active' AND expires_at <= $1
         ORDER BY expires_at, id
         LIMIT $2",
    )
    .bind(now)
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, player_id)| (TicketId::from_uuid(id), PlayerId::from_uuid(player_id)))
        .collect())
}
