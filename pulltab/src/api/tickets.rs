//! Ticket play: listing, reveal and claim.

#![allow(clippy::missing_errors_doc)]

use crate::api::{Pagination, PlayerIdentity};
use crate::server::AppState;
use crate::types::{TicketId, TicketView};
use axum::extract::State;
use axum::Json;
use pulltab_web::{AppError, AppJson, AppPath, AppQuery};
use serde::Deserialize;
use uuid::Uuid;

// ============================================================================
// Request DTOs
// ============================================================================

/// Body of `POST /api/tickets/:id/reveal`.
#[derive(Debug, Deserialize)]
pub struct RevealRequest {
    /// Zero-based tab position
    pub tab_index: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// List the caller's tickets, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/tickets?limit=20&offset=0
/// ```
pub async fn list_tickets(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<TicketView>>, AppError> {
    let tickets = state
        .service
        .tickets(player_id, page.limit(), page.offset())
        .await?;
    Ok(Json(tickets))
}

/// Fetch one of the caller's tickets.
///
/// # Endpoint
///
/// ```text
/// GET /api/tickets/:id
/// ```
pub async fn get_ticket(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppPath(ticket_id): AppPath<Uuid>,
) -> Result<Json<TicketView>, AppError> {
    let ticket = state.service.ticket(player_id, TicketId::from_uuid(ticket_id)).await?;
    Ok(Json(ticket))
}

/// Reveal a single tab.
///
/// # Endpoint
///
/// ```text
/// POST /api/tickets/:id/reveal
/// { "tab_index": 3 }
/// ```
pub async fn reveal_tab(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppPath(ticket_id): AppPath<Uuid>,
    AppJson(request): AppJson<RevealRequest>,
) -> Result<Json<TicketView>, AppError> {
    let ticket = state
        .service
        .reveal(player_id, TicketId::from_uuid(ticket_id), request.tab_index)
        .await?;
    Ok(Json(ticket))
}

/// Reveal every hidden tab.
///
/// # Endpoint
///
/// ```text
/// POST /api/tickets/:id/reveal-all
/// ```
pub async fn reveal_all(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppPath(ticket_id): AppPath<Uuid>,
) -> Result<Json<TicketView>, AppError> {
    let ticket = state
        .service
        .reveal_all(player_id, TicketId::from_uuid(ticket_id))
        .await?;
    Ok(Json(ticket))
}

/// Claim the prize of a revealed winning ticket.
///
/// # Endpoint
///
/// ```text
/// POST /api/tickets/:id/claim
/// ```
pub async fn claim_prize(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppPath(ticket_id): AppPath<Uuid>,
) -> Result<Json<TicketView>, AppError> {
    let ticket = state.service.claim(player_id, TicketId::from_uuid(ticket_id)).await?;
    Ok(Json(ticket))
}
