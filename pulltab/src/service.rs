//! The persistence shell around the ticket reducer.
//!
//! Every mutating operation follows the same path:
//!
//! 1. Open a transaction and lock the wallet, then the ticket
//! 2. Run the reducer against the locked state
//! 3. On rejection, roll back and return the domain error
//! 4. Otherwise write the ticket, balance, ledger entries and audit events
//! 5. Commit, then execute the reducer's effects
//!
//! Reads go straight to the pool.

use crate::aggregates::{TicketAction, TicketEnvironment, TicketReducer, TicketState};
use crate::error::PullTabError;
use crate::generator::generate_tabs;
use crate::metrics;
use crate::persistence::{designs, events, ledger, tickets, wallets};
use crate::types::{
    Coins, DesignId, DesignSpec, LedgerEntry, LedgerKind, NewLedgerEntry, PlayerId,
    PullTabDesign, TicketId, TicketView, Wallet,
};
use pulltab_core::reducer::Reducer;
use pulltab_postgres::DatabaseError;
use pulltab_runtime::metrics::ReducerMetrics;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;

/// Errors from service operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The command was rejected by domain rules
    #[error(transparent)]
    Domain(#[from] PullTabError),

    /// The database failed
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// An event could not be serialized for the audit log
    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    /// The shared random number generator is unusable
    #[error("Random number generator unavailable: {0}")]
    Rng(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Pull-tab service: purchase, reveal, claim, expiry, reads and admin
/// operations.
#[derive(Clone)]
pub struct PullTabService {
    pool: PgPool,
    reducer: TicketReducer,
    env: TicketEnvironment,
    rng: Arc<Mutex<StdRng>>,
}

impl PullTabService {
    /// Create a service with an entropy-seeded generator.
    #[must_use]
    pub fn new(pool: PgPool, env: TicketEnvironment) -> Self {
        Self::with_rng(pool, env, StdRng::from_entropy())
    }

    /// Create a service with a caller-provided generator.
    #[must_use]
    pub fn with_rng(pool: PgPool, env: TicketEnvironment, rng: StdRng) -> Self {
        Self {
            pool,
            reducer: TicketReducer::new(),
            env,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// The connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ========================================================================
    // Player commands
    // ========================================================================

    /// Buy a ticket of `design_id`.
    ///
    /// # Errors
    ///
    /// - [`PullTabError::DesignNotFound`] / [`PullTabError::DesignInactive`]
    /// - [`PullTabError::InsufficientBalance`] before any mutation
    /// - [`ServiceError::Database`] if the transaction fails
    pub async fn purchase(&self, player_id: PlayerId, design_id: DesignId) -> ServiceResult<TicketView> {
        let started = Instant::now();

        let design = designs::get(&self.pool, design_id)
            .await?
            .ok_or(PullTabError::DesignNotFound(design_id))
            .map_err(reject)?;
        if !design.active {
            return Err(reject(PullTabError::DesignInactive(design_id)));
        }

        let wallet = wallets::get(&self.pool, player_id).await?;
        if wallet.balance < design.cost {
            return Err(reject(PullTabError::InsufficientBalance {
                balance: wallet.balance,
                cost: design.cost,
            }));
        }

        let tabs = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|e| ServiceError::Rng(e.to_string()))?;
            generate_tabs(&design.spec(), &mut *rng)?
        };

        let mut tx = self.pool.begin().await?;
        let wallet = wallets::lock(&mut tx, player_id).await?;
        let ticket_id = TicketId::new();

        let state = self
            .execute(
                tx,
                TicketState::for_wallet(wallet),
                TicketAction::PurchaseTicket {
                    ticket_id,
                    design,
                    tabs,
                },
            )
            .await?;

        metrics::record_ticket_purchased();
        metrics::record_command_duration("purchase", started.elapsed());
        tracing::info!(
            %player_id,
            %ticket_id,
            %design_id,
            balance = state.wallet.balance.amount(),
            "Ticket purchased"
        );

        view_of(&state, ticket_id)
    }

    /// Reveal one tab.
    ///
    /// # Errors
    ///
    /// - [`PullTabError::TicketNotFound`] for unknown or foreign tickets
    /// - [`PullTabError::TabIndexOutOfRange`] / [`PullTabError::TabAlreadyRevealed`]
    /// - [`PullTabError::TicketExpired`] / [`PullTabError::AlreadyClaimed`]
    pub async fn reveal(
        &self,
        player_id: PlayerId,
        ticket_id: TicketId,
        tab_index: usize,
    ) -> ServiceResult<TicketView> {
        let started = Instant::now();
        let state = self
            .on_ticket(player_id, ticket_id, TicketAction::RevealTab { ticket_id, tab_index })
            .await?;

        metrics::record_tabs_revealed(1);
        metrics::record_command_duration("reveal", started.elapsed());
        tracing::debug!(%player_id, %ticket_id, tab_index, "Tab revealed");

        view_of(&state, ticket_id)
    }

    /// Reveal every hidden tab.
    ///
    /// # Errors
    ///
    /// As [`Self::reveal`], plus [`PullTabError::NothingToReveal`].
    pub async fn reveal_all(&self, player_id: PlayerId, ticket_id: TicketId) -> ServiceResult<TicketView> {
        let started = Instant::now();
        let state = self
            .on_ticket(player_id, ticket_id, TicketAction::RevealAll { ticket_id })
            .await?;

        metrics::record_tabs_revealed(state.recorded.len());
        metrics::record_command_duration("reveal_all", started.elapsed());
        tracing::debug!(%player_id, %ticket_id, revealed = state.recorded.len(), "Tabs revealed");

        view_of(&state, ticket_id)
    }

    /// Claim the prize of a ticket whose winning tab is revealed.
    ///
    /// # Errors
    ///
    /// - [`PullTabError::AlreadyClaimed`] on a second claim
    /// - [`PullTabError::NoPrize`] / [`PullTabError::PrizeNotRevealed`]
    /// - [`PullTabError::TicketExpired`]
    pub async fn claim(&self, player_id: PlayerId, ticket_id: TicketId) -> ServiceResult<TicketView> {
        let started = Instant::now();
        let state = self
            .on_ticket(player_id, ticket_id, TicketAction::ClaimPrize { ticket_id })
            .await?;

        let prize = state
            .ticket
            .as_ref()
            .and_then(crate::types::PullTabTicket::prize)
            .unwrap_or(Coins::ZERO);
        metrics::record_prize_claimed(prize.amount());
        metrics::record_command_duration("claim", started.elapsed());
        tracing::info!(
            %player_id,
            %ticket_id,
            prize = prize.amount(),
            balance = state.wallet.balance.amount(),
            "Prize claimed"
        );

        view_of(&state, ticket_id)
    }

    /// Expire up to `limit` active tickets whose lifetime has ended.
    ///
    /// Each ticket is expired in its own transaction. A ticket that was
    /// claimed between listing and locking is skipped.
    ///
    /// Returns the number of tickets expired.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the due tickets cannot be listed.
    pub async fn expire_due(&self, limit: i64) -> ServiceResult<usize> {
        let now = self.env.clock.now();
        let due = tickets::due_for_expiry(&self.pool, now, limit).await?;
        let mut expired = 0;

        for (ticket_id, player_id) in due {
            match self
                .on_ticket(player_id, ticket_id, TicketAction::ExpireTicket { ticket_id })
                .await
            {
                Ok(_) => {
                    expired += 1;
                    metrics::record_ticket_expired();
                },
                Err(ServiceError::Domain(error)) => {
                    tracing::debug!(%ticket_id, %error, "Skipping ticket during expiry");
                },
                Err(error) => {
                    tracing::warn!(%ticket_id, %error, "Failed to expire ticket");
                },
            }
        }

        Ok(expired)
    }

    // ========================================================================
    // Player reads
    // ========================================================================

    /// One of the player's tickets.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::TicketNotFound`] for unknown or foreign tickets.
    pub async fn ticket(&self, player_id: PlayerId, ticket_id: TicketId) -> ServiceResult<TicketView> {
        tickets::get(&self.pool, ticket_id)
            .await?
            .filter(|ticket| ticket.player_id == player_id)
            .map(|ticket| ticket.view())
            .ok_or_else(|| PullTabError::TicketNotFound(ticket_id).into())
    }

    /// The player's tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the query fails.
    pub async fn tickets(&self, player_id: PlayerId, limit: i64, offset: i64) -> ServiceResult<Vec<TicketView>> {
        let tickets = tickets::list_for_player(&self.pool, player_id, limit, offset).await?;
        Ok(tickets.iter().map(crate::types::PullTabTicket::view).collect())
    }

    /// The player's wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the query fails.
    pub async fn wallet(&self, player_id: PlayerId) -> ServiceResult<Wallet> {
        Ok(wallets::get(&self.pool, player_id).await?)
    }

    /// The player's ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the query fails.
    pub async fn ledger(&self, player_id: PlayerId, limit: i64, offset: i64) -> ServiceResult<Vec<LedgerEntry>> {
        Ok(ledger::list_for_player(&self.pool, player_id, limit, offset).await?)
    }

    /// One design; inactive designs are hidden unless `include_inactive`.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::DesignNotFound`] if there is no visible design.
    pub async fn design(&self, design_id: DesignId, include_inactive: bool) -> ServiceResult<PullTabDesign> {
        designs::get(&self.pool, design_id)
            .await?
            .filter(|design| design.active || include_inactive)
            .ok_or_else(|| PullTabError::DesignNotFound(design_id).into())
    }

    /// Designs ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Database`] if the query fails.
    pub async fn list_designs(&self, include_inactive: bool) -> ServiceResult<Vec<PullTabDesign>> {
        Ok(designs::list(&self.pool, include_inactive).await?)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Create an active design.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::InvalidDesign`] if the settings are invalid.
    pub async fn create_design(&self, spec: DesignSpec) -> ServiceResult<PullTabDesign> {
        spec.validate().map_err(reject)?;

        let design = PullTabDesign::from_spec(DesignId::new(), spec, self.env.clock.now());
        designs::insert(&self.pool, &design).await?;

        tracing::info!(design_id = %design.id, name = %design.name, "Design created");
        Ok(design)
    }

    /// Replace a design's settings. Existing tickets keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::InvalidDesign`] or [`PullTabError::DesignNotFound`].
    pub async fn update_design(&self, design_id: DesignId, spec: DesignSpec) -> ServiceResult<PullTabDesign> {
        spec.validate().map_err(reject)?;

        let design = designs::update(&self.pool, design_id, &spec, self.env.clock.now())
            .await?
            .ok_or(PullTabError::DesignNotFound(design_id))
            .map_err(reject)?;

        tracing::info!(%design_id, "Design updated");
        Ok(design)
    }

    /// Put a design on or off sale.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::DesignNotFound`] if the design does not exist.
    pub async fn set_design_active(&self, design_id: DesignId, active: bool) -> ServiceResult<PullTabDesign> {
        let design = designs::set_active(&self.pool, design_id, active, self.env.clock.now())
            .await?
            .ok_or(PullTabError::DesignNotFound(design_id))
            .map_err(reject)?;

        tracing::info!(%design_id, active, "Design availability changed");
        Ok(design)
    }

    /// Grant coins to a player.
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::InvalidAmount`] for zero, or
    /// [`PullTabError::BalanceOverflow`] if the balance would leave the
    /// representable range.
    pub async fn credit_wallet(&self, player_id: PlayerId, amount: Coins) -> ServiceResult<Wallet> {
        if amount.is_zero() {
            return Err(reject(PullTabError::InvalidAmount));
        }

        let mut tx = self.pool.begin().await?;
        let mut wallet = wallets::lock(&mut tx, player_id).await?;

        let balance_after = wallet
            .balance
            .checked_add(amount)
            .filter(|balance| balance.to_i64().is_ok())
            .ok_or(PullTabError::BalanceOverflow)
            .map_err(reject)?;
        let signed_amount = amount.to_i64().map_err(reject)?;

        wallet.balance = balance_after;
        wallets::save(&mut *tx, &wallet).await?;
        ledger::insert(
            &mut *tx,
            &NewLedgerEntry {
                player_id,
                ticket_id: None,
                kind: LedgerKind::AdminCredit,
                amount: signed_amount,
                balance_after,
                created_at: self.env.clock.now(),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(%player_id, amount = amount.amount(), balance = balance_after.amount(), "Wallet credited");
        Ok(wallet)
    }

    // ========================================================================
    // Shell
    // ========================================================================

    /// Lock the wallet and an owned ticket, then run `action` against them.
    async fn on_ticket(
        &self,
        player_id: PlayerId,
        ticket_id: TicketId,
        action: TicketAction,
    ) -> ServiceResult<TicketState> {
        let mut tx = self.pool.begin().await?;
        let wallet = wallets::lock(&mut tx, player_id).await?;
        let ticket = tickets::lock(&mut *tx, ticket_id)
            .await?
            .filter(|ticket| ticket.player_id == player_id)
            .ok_or(PullTabError::TicketNotFound(ticket_id))
            .map_err(reject)?;

        self.execute(tx, TicketState::with_ticket(wallet, ticket), action)
            .await
    }

    /// Reduce `action`, persist the outcome, commit, then run effects.
    async fn execute(
        &self,
        mut tx: Transaction<'static, Postgres>,
        mut state: TicketState,
        action: TicketAction,
    ) -> ServiceResult<TicketState> {
        ReducerMetrics::record_command(action.variant_name());

        let effects = self.reducer.reduce(&mut state, action, &self.env);

        if let Some(error) = state.last_error.take() {
            tx.rollback().await?;
            return Err(reject(error));
        }

        Self::persist(&mut tx, &state).await?;
        tx.commit().await?;

        let feedback = pulltab_runtime::execute_all(effects).await;
        if !feedback.is_empty() {
            tracing::warn!(count = feedback.len(), "Discarding actions produced by effects");
        }

        Ok(state)
    }

    /// Write everything the applied events changed.
    async fn persist(tx: &mut Transaction<'static, Postgres>, state: &TicketState) -> ServiceResult<()> {
        let Some(ticket) = state.ticket.as_ref() else {
            return Ok(());
        };

        let mut inserted = false;
        for event in &state.recorded {
            if let TicketAction::TicketPurchased { ticket, .. } = event {
                tickets::insert(&mut **tx, ticket).await?;
                inserted = true;
            }
        }
        if !inserted && !state.recorded.is_empty() {
            tickets::update(&mut **tx, ticket).await?;
        }

        if state.balance_changed() {
            wallets::save(&mut **tx, &state.wallet).await?;
        }
        for entry in &state.pending_ledger {
            ledger::insert(&mut **tx, entry).await?;
        }

        for event in &state.recorded {
            let payload =
                serde_json::to_value(event).map_err(|e| ServiceError::Serialization(e.to_string()))?;
            events::append(&mut **tx, ticket.id, event.event_type(), &payload).await?;
        }

        Ok(())
    }
}

/// Count a rejection and pass it on.
fn reject(error: PullTabError) -> ServiceError {
    metrics::record_rejection(error.reason());
    tracing::debug!(reason = error.reason(), %error, "Command rejected");
    ServiceError::Domain(error)
}

fn view_of(state: &TicketState, ticket_id: TicketId) -> ServiceResult<TicketView> {
    state
        .ticket
        .as_ref()
        .map(crate::types::PullTabTicket::view)
        .ok_or_else(|| PullTabError::TicketNotFound(ticket_id).into())
}
