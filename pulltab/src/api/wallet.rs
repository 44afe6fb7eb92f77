//! Wallet balance and ledger history.

#![allow(clippy::missing_errors_doc)]

use crate::api::{Pagination, PlayerIdentity};
use crate::server::AppState;
use crate::types::{LedgerEntry, Wallet};
use axum::extract::State;
use axum::Json;
use pulltab_web::{AppError, AppQuery};

/// Current balance; players without a wallet row see zero.
///
/// # Endpoint
///
/// ```text
/// GET /api/wallet
/// ```
pub async fn get_wallet(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
) -> Result<Json<Wallet>, AppError> {
    Ok(Json(state.service.wallet(player_id).await?))
}

/// Balance movements, newest first.
///
/// # Endpoint
///
/// ```text
/// GET /api/wallet/ledger?limit=20&offset=0
/// ```
pub async fn get_ledger(
    PlayerIdentity(player_id): PlayerIdentity,
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> Result<Json<Vec<LedgerEntry>>, AppError> {
    let entries = state
        .service
        .ledger(player_id, page.limit(), page.offset())
        .await?;
    Ok(Json(entries))
}
