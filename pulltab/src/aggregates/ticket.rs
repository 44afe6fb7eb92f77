//! Ticket aggregate for the pull-tab engine.
//!
//! One reduction covers one ticket and its owner's wallet. The persistence
//! shell locks both rows, runs the reducer, and writes back whatever the
//! applied events changed: the ticket, the balance, the pending ledger
//! entries and the audit events. A rejected command leaves everything but
//! `last_error` untouched, so the shell can roll back without inspecting
//! partial state.
//!
//! **Money rule**: every balance movement is computed during validation and
//! carried in the event as `balance_after`. Applying an event never fails.

use crate::error::PullTabError;
use crate::generator::verify_tabs;
use crate::notify::{Notifier, PlayerNotification};
use crate::types::{
    ClaimStatus, Coins, LedgerKind, NewLedgerEntry, PullTabDesign, PullTabTicket, Tab, TabValue,
    TicketId, TicketStatus, Wallet,
};
use chrono::{DateTime, Utc};
use pulltab_core::{
    async_effect, effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec,
};
use pulltab_macros::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the ticket aggregate
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TicketAction {
    // Commands
    /// Buy a ticket with a pre-generated tab layout
    #[command]
    PurchaseTicket {
        /// Identifier for the new ticket
        ticket_id: TicketId,
        /// Design being purchased
        design: PullTabDesign,
        /// Tabs produced by the generator
        tabs: Vec<Tab>,
    },

    /// Pull a single tab
    #[command]
    RevealTab {
        /// Ticket to reveal on
        ticket_id: TicketId,
        /// Tab position
        tab_index: usize,
    },

    /// Pull every remaining tab
    #[command]
    RevealAll {
        /// Ticket to reveal on
        ticket_id: TicketId,
    },

    /// Collect the prize of a revealed winning tab
    #[command]
    ClaimPrize {
        /// Ticket to claim
        ticket_id: TicketId,
    },

    /// Close a ticket whose lifetime has elapsed
    #[command]
    ExpireTicket {
        /// Ticket to expire
        ticket_id: TicketId,
    },

    // Events
    /// A ticket was bought and its cost debited
    #[event]
    TicketPurchased {
        /// The new ticket
        ticket: PullTabTicket,
        /// Wallet balance after the debit
        balance_after: Coins,
    },

    /// A tab was pulled
    #[event]
    TabRevealed {
        /// Ticket the tab belongs to
        ticket_id: TicketId,
        /// Tab position
        tab_index: usize,
        /// What was under it
        value: TabValue,
        /// When it was pulled
        revealed_at: DateTime<Utc>,
    },

    /// The prize was credited
    #[event]
    PrizeClaimed {
        /// Claimed ticket
        ticket_id: TicketId,
        /// Amount credited
        prize: Coins,
        /// Wallet balance after the credit
        balance_after: Coins,
        /// When the claim happened
        claimed_at: DateTime<Utc>,
    },

    /// The ticket ran out of time
    #[event]
    TicketExpired {
        /// Expired ticket
        ticket_id: TicketId,
        /// Unclaimed prize that was lost
        forfeited_prize: Option<Coins>,
        /// When the ticket was expired
        expired_at: DateTime<Utc>,
    },

    /// A command was rejected
    #[event]
    ValidationFailed {
        /// Why
        error: PullTabError,
    },
}

// ============================================================================
// State
// ============================================================================

/// State for one reduction: a wallet and, after purchase, its ticket
#[derive(Clone, Debug, PartialEq)]
pub struct TicketState {
    /// Owner's wallet
    pub wallet: Wallet,
    /// The ticket, once purchased or loaded
    pub ticket: Option<PullTabTicket>,
    /// Ledger entries produced by applied events, not yet written
    pub pending_ledger: Vec<NewLedgerEntry>,
    /// Events applied during this reduction, in order
    pub recorded: Vec<TicketAction>,
    /// Last validation error
    pub last_error: Option<PullTabError>,
}

impl TicketState {
    /// State for a purchase: just the buyer's wallet
    #[must_use]
    pub const fn for_wallet(wallet: Wallet) -> Self {
        Self {
            wallet,
            ticket: None,
            pending_ledger: Vec::new(),
            recorded: Vec::new(),
            last_error: None,
        }
    }

    /// State for a command on an existing ticket
    #[must_use]
    pub const fn with_ticket(wallet: Wallet, ticket: PullTabTicket) -> Self {
        Self {
            wallet,
            ticket: Some(ticket),
            pending_ledger: Vec::new(),
            recorded: Vec::new(),
            last_error: None,
        }
    }

    /// Returns true if the balance changed during this reduction
    #[must_use]
    pub fn balance_changed(&self) -> bool {
        !self.pending_ledger.is_empty()
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the ticket aggregate
#[derive(Clone)]
pub struct TicketEnvironment {
    /// Clock for timestamps and expiry checks
    pub clock: Arc<dyn Clock>,
    /// Player notifications
    pub notifier: Arc<dyn Notifier>,
    /// How long a ticket stays playable after purchase
    pub ticket_ttl: chrono::Duration,
}

impl TicketEnvironment {
    /// Creates a new `TicketEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        ticket_ttl: chrono::Duration,
    ) -> Self {
        Self {
            clock,
            notifier,
            ticket_ttl,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the ticket aggregate
#[derive(Clone, Debug, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Creates a new `TicketReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Ticket addressed by `ticket_id` and owned by the wallet's player.
    ///
    /// A ticket owned by someone else is reported as missing.
    fn owned_ticket(
        state: &TicketState,
        ticket_id: TicketId,
    ) -> Result<&PullTabTicket, PullTabError> {
        state
            .ticket
            .as_ref()
            .filter(|t| t.id == ticket_id && t.player_id == state.wallet.player_id)
            .ok_or(PullTabError::TicketNotFound(ticket_id))
    }

    /// Owned ticket that can still be revealed or claimed at `now`.
    fn playable_ticket(
        state: &TicketState,
        ticket_id: TicketId,
        now: DateTime<Utc>,
    ) -> Result<&PullTabTicket, PullTabError> {
        let ticket = Self::owned_ticket(state, ticket_id)?;
        match ticket.status {
            TicketStatus::Claimed => Err(PullTabError::AlreadyClaimed(ticket_id)),
            TicketStatus::Expired => Err(PullTabError::TicketExpired(ticket_id)),
            TicketStatus::Active if ticket.is_past_expiry(now) => {
                Err(PullTabError::TicketExpired(ticket_id))
            },
            TicketStatus::Active => Ok(ticket),
        }
    }

    /// Validates `PurchaseTicket` and returns the balance after the debit
    fn validate_purchase(
        state: &TicketState,
        ticket_id: TicketId,
        design: &PullTabDesign,
        tabs: &[Tab],
    ) -> Result<Coins, PullTabError> {
        if state.ticket.is_some() {
            return Err(PullTabError::TicketAlreadyExists(ticket_id));
        }
        if !design.active {
            return Err(PullTabError::DesignInactive(design.id));
        }

        let spec = design.spec();
        spec.validate()?;
        verify_tabs(&spec, tabs)?;

        state
            .wallet
            .balance
            .checked_sub(design.cost)
            .ok_or(PullTabError::InsufficientBalance {
                balance: state.wallet.balance,
                cost: design.cost,
            })
    }

    /// Validates `RevealTab` and returns the value under the tab
    fn validate_reveal(
        state: &TicketState,
        ticket_id: TicketId,
        tab_index: usize,
        now: DateTime<Utc>,
    ) -> Result<TabValue, PullTabError> {
        let ticket = Self::playable_ticket(state, ticket_id, now)?;
        let tab = ticket
            .tabs
            .get(tab_index)
            .ok_or(PullTabError::TabIndexOutOfRange {
                index: tab_index,
                tab_count: ticket.tabs.len(),
            })?;

        if tab.revealed {
            return Err(PullTabError::TabAlreadyRevealed(tab_index));
        }
        Ok(tab.value)
    }

    /// Validates `RevealAll` and returns the hidden tabs
    fn validate_reveal_all(
        state: &TicketState,
        ticket_id: TicketId,
        now: DateTime<Utc>,
    ) -> Result<Vec<(usize, TabValue)>, PullTabError> {
        let ticket = Self::playable_ticket(state, ticket_id, now)?;
        let hidden: Vec<(usize, TabValue)> = ticket
            .tabs
            .iter()
            .filter(|tab| !tab.revealed)
            .map(|tab| (tab.index, tab.value))
            .collect();

        if hidden.is_empty() {
            return Err(PullTabError::NothingToReveal(ticket_id));
        }
        Ok(hidden)
    }

    /// Validates `ClaimPrize` and returns the prize and the balance after it
    fn validate_claim(
        state: &TicketState,
        ticket_id: TicketId,
        now: DateTime<Utc>,
    ) -> Result<(Coins, Coins), PullTabError> {
        let ticket = Self::playable_ticket(state, ticket_id, now)?;
        let winner = ticket
            .winning_tab()
            .ok_or(PullTabError::NoPrize(ticket_id))?;

        if !winner.revealed {
            return Err(PullTabError::PrizeNotRevealed(ticket_id));
        }

        let prize = winner.value.prize().ok_or(PullTabError::NoPrize(ticket_id))?;
        let balance_after = state
            .wallet
            .balance
            .checked_add(prize)
            .ok_or(PullTabError::BalanceOverflow)?;
        Ok((prize, balance_after))
    }

    /// Validates `ExpireTicket` and returns the forfeited prize
    fn validate_expire(
        state: &TicketState,
        ticket_id: TicketId,
        now: DateTime<Utc>,
    ) -> Result<Option<Coins>, PullTabError> {
        let ticket = Self::owned_ticket(state, ticket_id)?;
        match ticket.status {
            TicketStatus::Claimed => Err(PullTabError::AlreadyClaimed(ticket_id)),
            TicketStatus::Expired => Err(PullTabError::TicketExpired(ticket_id)),
            TicketStatus::Active if !ticket.is_past_expiry(now) => {
                Err(PullTabError::NotYetExpired(ticket_id))
            },
            TicketStatus::Active => Ok(ticket.prize()),
        }
    }

    /// Applies an event to state
    fn apply_event(state: &mut TicketState, action: &TicketAction) {
        match action {
            TicketAction::TicketPurchased {
                ticket,
                balance_after,
            } => {
                state.wallet.balance = *balance_after;
                state.pending_ledger.push(NewLedgerEntry {
                    player_id: ticket.player_id,
                    ticket_id: Some(ticket.id),
                    kind: LedgerKind::TicketPurchase,
                    amount: debit(ticket.cost),
                    balance_after: *balance_after,
                    created_at: ticket.purchased_at,
                });
                state.ticket = Some(ticket.clone());
                state.last_error = None;
            },
            TicketAction::TabRevealed { tab_index, .. } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    if let Some(tab) = ticket.tabs.get_mut(*tab_index) {
                        tab.revealed = true;
                    }
                    if ticket.is_fully_revealed() && ticket.prize().is_none() {
                        ticket.claim_status = ClaimStatus::NoPrize;
                    }
                }
                state.last_error = None;
            },
            TicketAction::PrizeClaimed {
                ticket_id,
                prize,
                balance_after,
                claimed_at,
            } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.status = TicketStatus::Claimed;
                    ticket.claim_status = ClaimStatus::Claimed;
                    ticket.claimed_at = Some(*claimed_at);
                }
                state.wallet.balance = *balance_after;
                state.pending_ledger.push(NewLedgerEntry {
                    player_id: state.wallet.player_id,
                    ticket_id: Some(*ticket_id),
                    kind: LedgerKind::PrizePayout,
                    amount: credit(*prize),
                    balance_after: *balance_after,
                    created_at: *claimed_at,
                });
                state.last_error = None;
            },
            TicketAction::TicketExpired { expired_at, .. } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.status = TicketStatus::Expired;
                    ticket.expired_at = Some(*expired_at);
                }
                state.last_error = None;
            },
            TicketAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
                return;
            },
            // Commands are not applied to state
            _ => return,
        }

        state.recorded.push(action.clone());
    }

    fn reject(state: &mut TicketState, error: PullTabError) -> SmallVec<[Effect<TicketAction>; 4]> {
        tracing::debug!(reason = error.reason(), %error, "Ticket command rejected");
        Self::apply_event(state, &TicketAction::ValidationFailed { error });
        SmallVec::new()
    }

    fn notify(env: &TicketEnvironment, notification: PlayerNotification) -> Effect<TicketAction> {
        let notifier = Arc::clone(&env.notifier);
        async_effect! {
            notifier.notify(notification).await;
            None
        }
    }
}

/// Signed ledger amount for a debit.
fn debit(amount: Coins) -> i64 {
    i64::try_from(amount.amount()).map_or(i64::MIN, |v| -v)
}

/// Signed ledger amount for a credit.
fn credit(amount: Coins) -> i64 {
    i64::try_from(amount.amount()).unwrap_or(i64::MAX)
}

impl Reducer for TicketReducer {
    type State = TicketState;
    type Action = TicketAction;
    type Environment = TicketEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let now = env.clock.now();

        match action {
            // ========== Commands ==========
            TicketAction::PurchaseTicket {
                ticket_id,
                design,
                tabs,
            } => {
                let balance_after =
                    match Self::validate_purchase(state, ticket_id, &design, &tabs) {
                        Ok(balance) => balance,
                        Err(error) => return Self::reject(state, error),
                    };

                let ticket = PullTabTicket {
                    id: ticket_id,
                    player_id: state.wallet.player_id,
                    design_id: design.id,
                    cost: design.cost,
                    tabs,
                    status: TicketStatus::Active,
                    claim_status: ClaimStatus::Unclaimed,
                    purchased_at: now,
                    expires_at: now
                        .checked_add_signed(env.ticket_ttl)
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                    claimed_at: None,
                    expired_at: None,
                };

                Self::apply_event(
                    state,
                    &TicketAction::TicketPurchased {
                        ticket,
                        balance_after,
                    },
                );

                smallvec![Self::notify(
                    env,
                    PlayerNotification::TicketPurchased {
                        player_id: state.wallet.player_id,
                        ticket_id,
                        cost: design.cost,
                    }
                )]
            },

            TicketAction::RevealTab {
                ticket_id,
                tab_index,
            } => {
                match Self::validate_reveal(state, ticket_id, tab_index, now) {
                    Ok(value) => Self::apply_event(
                        state,
                        &TicketAction::TabRevealed {
                            ticket_id,
                            tab_index,
                            value,
                            revealed_at: now,
                        },
                    ),
                    Err(error) => return Self::reject(state, error),
                }
                SmallVec::new()
            },

            TicketAction::RevealAll { ticket_id } => {
                let hidden = match Self::validate_reveal_all(state, ticket_id, now) {
                    Ok(hidden) => hidden,
                    Err(error) => return Self::reject(state, error),
                };

                for (tab_index, value) in hidden {
                    Self::apply_event(
                        state,
                        &TicketAction::TabRevealed {
                            ticket_id,
                            tab_index,
                            value,
                            revealed_at: now,
                        },
                    );
                }
                SmallVec::new()
            },

            TicketAction::ClaimPrize { ticket_id } => {
                let (prize, balance_after) = match Self::validate_claim(state, ticket_id, now) {
                    Ok(outcome) => outcome,
                    Err(error) => return Self::reject(state, error),
                };

                Self::apply_event(
                    state,
                    &TicketAction::PrizeClaimed {
                        ticket_id,
                        prize,
                        balance_after,
                        claimed_at: now,
                    },
                );

                smallvec![Self::notify(
                    env,
                    PlayerNotification::PrizeAwarded {
                        player_id: state.wallet.player_id,
                        ticket_id,
                        prize,
                        balance: balance_after,
                    }
                )]
            },

            TicketAction::ExpireTicket { ticket_id } => {
                let forfeited_prize = match Self::validate_expire(state, ticket_id, now) {
                    Ok(forfeited) => forfeited,
                    Err(error) => return Self::reject(state, error),
                };

                Self::apply_event(
                    state,
                    &TicketAction::TicketExpired {
                        ticket_id,
                        forfeited_prize,
                        expired_at: now,
                    },
                );

                smallvec![Self::notify(
                    env,
                    PlayerNotification::TicketExpired {
                        player_id: state.wallet.player_id,
                        ticket_id,
                        forfeited_prize,
                    }
                )]
            },

            // ========== Events (replayed, e.g. in tests) ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            },
        }
    }
}
