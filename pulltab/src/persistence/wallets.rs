//! `wallets` queries.
//!
//! A player without a row has a zero balance; rows are created lazily the
//! first time a wallet is locked.

use super::{bigint, coins};
use crate::types::{PlayerId, Wallet};
use pulltab_postgres::DatabaseError;
use sqlx::{PgConnection, PgExecutor};

/// Lock a player's wallet for the rest of the transaction, creating it if
/// needed.
///
/// # Errors
///
/// Returns [`DatabaseError`] if either statement fails.
pub async fn lock(conn: &mut PgConnection, player_id: PlayerId) -> Result<Wallet, DatabaseError> {
    sqlx::query("INSERT INTO wallets (player_id) VALUES ($1) ON CONFLICT (player_id) DO NOTHING")
        .bind(player_id.as_uuid())
        .execute(&mut *conn)
        .await?;

    let (balance,): (i64,) =
        sqlx::query_as("SELECT balance FROM wallets WHERE player_id = $1 FOR UPDATE")
            .bind(player_id.as_uuid())
            .fetch_one(&mut *conn)
            .await?;

    Ok(Wallet {
        player_id,
        balance: coins("balance", balance)?,
    })
}

/// Read a player's wallet without locking it.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the query fails.
pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    player_id: PlayerId,
) -> Result<Wallet, DatabaseError> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT balance FROM wallets WHERE player_id = $1")
        .bind(player_id.as_uuid())
        .fetch_optional(executor)
        .await?;

    match row {
        Some((balance,)) => Ok(Wallet {
            player_id,
            balance: coins("balance", balance)?,
        }),
        None => Ok(Wallet::empty(player_id)),
    }
}

/// Write a new balance.
///
/// # Errors
///
/// Returns [`DatabaseError`] if the update fails, including the
/// `wallets_balance_non_negative` check.
pub async fn save<'e, E: PgExecutor<'e>>(executor: E, wallet: &Wallet) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE wallets SET balance = $2, updated_at = NOW() WHERE player_id = $1")
        .bind(wallet.player_id.as_uuid())
        .bind(bigint("balance", wallet.balance)?)
        .execute(executor)
        .await?;

    Ok(())
}
