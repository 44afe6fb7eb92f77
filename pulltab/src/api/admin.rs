//! Operator endpoints: design management and wallet credits.
//!
//! Every handler takes [`AdminGuard`], so requests without the configured
//! `X-Admin-Token` never reach the service.

#![allow(clippy::missing_errors_doc)]

use crate::api::AdminGuard;
use crate::server::AppState;
use crate::types::{Coins, DesignId, DesignSpec, PlayerId, PullTabDesign, Wallet};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pulltab_web::{AppError, AppJson, AppPath};
use serde::Deserialize;
use uuid::Uuid;

/// Body of `POST /api/admin/wallets/:player_id/credit`.
#[derive(Debug, Deserialize)]
pub struct CreditRequest {
    /// Coins to add
    pub amount: Coins,
}

/// List every design, including inactive ones.
///
/// # Endpoint
///
/// ```text
/// GET /api/admin/designs
/// ```
pub async fn list_all_designs(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<PullTabDesign>>, AppError> {
    Ok(Json(state.service.list_designs(true).await?))
}

/// Create a design; it starts active.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/designs
/// { "name": "Lucky 7", "cost": 10, "tab_count": 5,
///   "win_probability": 0.2, "min_prize": 5, "max_prize": 100 }
/// ```
pub async fn create_design(
    _admin: AdminGuard,
    State(state): State<AppState>,
    AppJson(spec): AppJson<DesignSpec>,
) -> Result<(StatusCode, Json<PullTabDesign>), AppError> {
    let design = state.service.create_design(spec).await?;
    Ok((StatusCode::CREATED, Json(design)))
}

/// Replace a design's settings. Tickets already sold keep their tabs.
///
/// # Endpoint
///
/// ```text
/// PUT /api/admin/designs/:id
/// ```
pub async fn update_design(
    _admin: AdminGuard,
    State(state): State<AppState>,
    AppPath(design_id): AppPath<Uuid>,
    AppJson(spec): AppJson<DesignSpec>,
) -> Result<Json<PullTabDesign>, AppError> {
    let design = state
        .service
        .update_design(DesignId::from_uuid(design_id), spec)
        .await?;
    Ok(Json(design))
}

/// Put a design on sale.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/designs/:id/activate
/// ```
pub async fn activate_design(
    _admin: AdminGuard,
    State(state): State<AppState>,
    AppPath(design_id): AppPath<Uuid>,
) -> Result<Json<PullTabDesign>, AppError> {
    let design = state
        .service
        .set_design_active(DesignId::from_uuid(design_id), true)
        .await?;
    Ok(Json(design))
}

/// Take a design off sale.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/designs/:id/deactivate
/// ```
pub async fn deactivate_design(
    _admin: AdminGuard,
    State(state): State<AppState>,
    AppPath(design_id): AppPath<Uuid>,
) -> Result<Json<PullTabDesign>, AppError> {
    let design = state
        .service
        .set_design_active(DesignId::from_uuid(design_id), false)
        .await?;
    Ok(Json(design))
}

/// Add coins to a player's wallet.
///
/// # Endpoint
///
/// ```text
/// POST /api/admin/wallets/:player_id/credit
/// { "amount": 100 }
/// ```
pub async fn credit_wallet(
    _admin: AdminGuard,
    State(state): State<AppState>,
    AppPath(player_id): AppPath<Uuid>,
    AppJson(request): AppJson<CreditRequest>,
) -> Result<Json<Wallet>, AppError> {
    let wallet = state
        .service
        .credit_wallet(PlayerId::from_uuid(player_id), request.amount)
        .await?;
    Ok(Json(wallet))
}
