//! Player-facing design catalogue and ticket purchase.

#![allow(clippy::missing_errors_doc)]

use crate::api::PlayerIdentity;
use crate::server::AppState;
use crate::types::{DesignId, PullTabDesign, TicketView};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pulltab_web::{AppError, AppPath};
use uuid::Uuid;

/// List designs currently on sale.
///
/// # Endpoint
///
/// ```text
/// GET /api/designs
/// ```
pub async fn list_designs(State(state): State<AppState>) -> Result<Json<Vec<PullTabDesign>>, AppError> {
    let designs = state.service.list_designs(false).await?;
    Ok(Json(designs))
}

/// Fetch one design that is on sale.
///
/// # Endpoint
///
/// ```text
/// GET /api/designs/:id
/// ```
pub async fn get_design(
    State(state): State<AppState>,
    AppPath(design_id): AppPath<Uuid>,
) -> Result<Json<PullTabDesign>, AppError> {
    let design = state.service.design(DesignId::from_uuid(design_id), false).await?;
    Ok(Json(design))
}

/// Buy a ticket.
///
/// Debits the design cost and returns the new ticket with every tab hidden.
///
/// # Endpoint
///
/// ```text
/// POST /api/designs/:id/purchase
/// X-Player-Id: <uuid>
/// ```
pub async fn purchase_ticket(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppPath(design_id): AppPath<Uuid>,
) -> Result<(StatusCode, Json<TicketView>), AppError> {
    let ticket = state
        .service
        .purchase(player_id, DesignId::from_uuid(design_id))
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}
