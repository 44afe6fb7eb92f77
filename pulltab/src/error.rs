//! Domain errors carried by the ticket reducer.

use crate::types::{Coins, DesignId, TicketId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a pull-tab command was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PullTabError {
    /// The design does not exist
    #[error("Design {0} not found")]
    DesignNotFound(DesignId),

    /// The design is not on sale
    #[error("Design {0} is not active")]
    DesignInactive(DesignId),

    /// The design settings are invalid
    #[error("Invalid design: {0}")]
    InvalidDesign(String),

    /// The ticket does not exist, or belongs to another player
    #[error("Ticket {0} not found")]
    TicketNotFound(TicketId),

    /// A ticket with this id is already loaded
    #[error("Ticket {0} already exists")]
    TicketAlreadyExists(TicketId),

    /// The wallet cannot cover the ticket cost
    #[error("Insufficient balance: have {balance}, need {cost}")]
    InsufficientBalance {
        /// Current balance
        balance: Coins,
        /// Ticket cost
        cost: Coins,
    },

    /// The tab index is outside the ticket
    #[error("Tab index {index} is out of range for a ticket with {tab_count} tabs")]
    TabIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Tabs on the ticket
        tab_count: usize,
    },

    /// The tab was already revealed
    #[error("Tab {0} is already revealed")]
    TabAlreadyRevealed(usize),

    /// Every tab is already revealed
    #[error("Ticket {0} has no hidden tabs left")]
    NothingToReveal(TicketId),

    /// The prize was already paid out
    #[error("Ticket {0} has already been claimed")]
    AlreadyClaimed(TicketId),

    /// The ticket is past its lifetime
    #[error("Ticket {0} has expired")]
    TicketExpired(TicketId),

    /// Expiry was requested before the ticket's lifetime elapsed
    #[error("Ticket {0} has not reached its expiry time")]
    NotYetExpired(TicketId),

    /// The ticket has no winning tab
    #[error("Ticket {0} has no prize")]
    NoPrize(TicketId),

    /// The winning tab has not been revealed
    #[error("Ticket {0} must reveal its winning tab before claiming")]
    PrizeNotRevealed(TicketId),

    /// The generated tabs do not match the design
    #[error("Tab layout rejected: {0}")]
    TamperedTabs(String),

    /// A balance would exceed the representable range
    #[error("Balance overflow")]
    BalanceOverflow,

    /// A credit amount must be positive
    #[error("Amount must be greater than zero")]
    InvalidAmount,
}

impl PullTabError {
    /// Stable label for metrics and logs
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::DesignNotFound(_) => "design_not_found",
            Self::DesignInactive(_) => "design_inactive",
            Self::InvalidDesign(_) => "invalid_design",
            Self::TicketNotFound(_) => "ticket_not_found",
            Self::TicketAlreadyExists(_) => "ticket_already_exists",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::TabIndexOutOfRange { .. } => "tab_index_out_of_range",
            Self::TabAlreadyRevealed(_) => "tab_already_revealed",
            Self::NothingToReveal(_) => "nothing_to_reveal",
            Self::AlreadyClaimed(_) => "already_claimed",
            Self::TicketExpired(_) => "ticket_expired",
            Self::NotYetExpired(_) => "not_yet_expired",
            Self::NoPrize(_) => "no_prize",
            Self::PrizeNotRevealed(_) => "prize_not_revealed",
            Self::TamperedTabs(_) => "tampered_tabs",
            Self::BalanceOverflow => "balance_overflow",
            Self::InvalidAmount => "invalid_amount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_message() {
        let err = PullTabError::InsufficientBalance {
            balance: Coins::new(3),
            cost: Coins::new(10),
        };
        assert_eq!(err.to_string(), "Insufficient balance: have 3, need 10");
        assert_eq!(err.reason(), "insufficient_balance");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = PullTabError::TabIndexOutOfRange { index: 7, tab_count: 5 };
        assert_eq!(
            err.to_string(),
            "Tab index 7 is out of range for a ticket with 5 tabs"
        );
    }
}
