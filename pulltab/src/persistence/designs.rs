//! `pull_tab_designs` queries.

use super::{bigint, coins, count};
use crate::types::{DesignId, DesignSpec, PullTabDesign};
use chrono::{DateTime, Utc};
use pulltab_postgres::DatabaseError;
use sqlx::PgExecutor;
use uuid::Uuid;

const COLUMNS: &str = "id, name, cost, tab_count, win_probability, min_prize, max_prize, \
                       active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct DesignRow {
    id: Uuid,
    name: String,
    cost: i64,
    tab_count: i32,
    win_probability: f64,
    min_prize: i64,
    max_prize: i64,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DesignRow> for PullTabDesign {
    type Error = DatabaseError;

    fn try_from(row: DesignRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DesignId::from_uuid(row.id),
            name: row.name,
            cost: coins("cost", row.cost)?,
            tab_count: count("tab_count", row.tab_count)?,
            win_probability: row.win_probability,
            min_prize: coins("min_prize", row.min_prize)?,
            max_prize: coins("max_prize", row.max_prize)?,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn tab_count(spec_count: usize) -> Result<i32, DatabaseError> {
    i32::try_from(spec_count)
        .map_err(|_| DatabaseError::Query(format!("tab_count {spec_count} exceeds INTEGER range")))
}

/// Insert a new design.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the insert fails.
pub async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    design: &PullTabDesign,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO pull_tab_designs
            (id, name, cost, tab_count, win_probability, min_prize, max_prize,
             active, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(design.id.as_uuid())
    .bind(&design.name)
    .bind(bigint("cost", design.cost)?)
    .bind(tab_count(design.tab_count)?)
    .bind(design.win_probability)
    .bind(bigint("min_prize", design.min_prize)?)
    .bind(bigint("max_prize", design.max_prize)?)
    .bind(design.active)
    .bind(design.created_at)
    .bind(design.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Replace the editable settings of a design.
///
/// Returns `None` if the design does not exist.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the update fails.
pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    id: DesignId,
    spec: &DesignSpec,
    now: DateTime<Utc>,
) -> Result<Option<PullTabDesign>, DatabaseError> {
    let row: Option<DesignRow> = sqlx::query_as(&format!(
        "UPDATE pull_tab_designs
         SET name = $2, cost = $3, tab_count = $4, win_probability = $5,
             min_prize = $6, max_prize = $7, updated_at = $8
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id.as_uuid())
    .bind(&spec.name)
    .bind(bigint("cost", spec.cost)?)
    .bind(tab_count(spec.tab_count)?)
    .bind(spec.win_probability)
    .bind(bigint("min_prize", spec.min_prize)?)
    .bind(bigint("max_prize", spec.max_prize)?)
    .bind(now)
    .fetch_optional(executor)
    .await?;

    row.map(PullTabDesign::try_from).transpose()
}

/// Activate or deactivate a design.
///
/// Returns `None` if the design does not exist.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the update fails.
pub async fn set_active<'e, E: PgExecutor<'e>>(
    executor: E,
    id: DesignId,
    active: bool,
    now: DateTime<Utc>,
) -> Result<Option<PullTabDesign>, DatabaseError> {
    let row: Option<DesignRow> = sqlx::query_as(&format!(
        "UPDATE pull_tab_designs SET active = $2, updated_at = $3
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id.as_uuid())
    .bind(active)
    .bind(now)
    .fetch_optional(executor)
    .await?;

    row.map(PullTabDesign::try_from).transpose()
}

/// Load one design.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or the row cannot be decoded.
pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    id: DesignId,
) -> Result<Option<PullTabDesign>, DatabaseError> {
    let row: Option<DesignRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM pull_tab_designs WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(executor)
            .await?;

    row.map(PullTabDesign::try_from).transpose()
}

/// List designs ordered by name.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails or a row cannot be decoded.
pub async fn list<'e, E: PgExecutor<'e>>(
    executor: E,
    include_inactive: bool,
) -> Result<Vec<PullTabDesign>, DatabaseError> {
    let rows: Vec<DesignRow> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM pull_tab_designs
         WHERE active OR $1
         ORDER BY name, id"
    ))
    .bind(include_inactive)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(PullTabDesign::try_from).collect()
}
