//! Player notifications.
//!
//! The reducer describes notifications as effects; they run only after the
//! transaction that produced them has committed. Delivery is best effort and
//! never affects the outcome of a command.

use crate::types::{Coins, PlayerId, TicketId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Something a player should hear about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerNotification {
    /// A ticket was bought
    TicketPurchased {
        /// Buyer
        player_id: PlayerId,
        /// The new ticket
        ticket_id: TicketId,
        /// Amount debited
        cost: Coins,
    },
    /// A prize was credited
    PrizeAwarded {
        /// Winner
        player_id: PlayerId,
        /// The claimed ticket
        ticket_id: TicketId,
        /// Amount credited
        prize: Coins,
        /// Balance after the credit
        balance: Coins,
    },
    /// A ticket ran out of time
    TicketExpired {
        /// Owner
        player_id: PlayerId,
        /// The expired ticket
        ticket_id: TicketId,
        /// Prize lost by not claiming in time
        forfeited_prize: Option<Coins>,
    },
}

impl PlayerNotification {
    /// The player this notification is for
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        match self {
            Self::TicketPurchased { player_id, .. }
            | Self::PrizeAwarded { player_id, .. }
            | Self::TicketExpired { player_id, .. } => *player_id,
        }
    }
}

/// Delivers notifications to players.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: PlayerNotification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: PlayerNotification) {
        match &notification {
            PlayerNotification::TicketPurchased {
                player_id,
                ticket_id,
                cost,
            } => tracing::info!(%player_id, %ticket_id, cost = cost.amount(), "Ticket purchased"),
            PlayerNotification::PrizeAwarded {
                player_id,
                ticket_id,
                prize,
                balance,
            } => tracing::info!(
                %player_id,
                %ticket_id,
                prize = prize.amount(),
                balance = balance.amount(),
                "Prize awarded"
            ),
            PlayerNotification::TicketExpired {
                player_id,
                ticket_id,
                forfeited_prize,
            } => tracing::info!(
                %player_id,
                %ticket_id,
                forfeited = forfeited_prize.map(|p| p.amount()),
                "Ticket expired"
            ),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<PlayerNotification>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far
    #[must_use]
    pub fn delivered(&self) -> Vec<PlayerNotification> {
        self.delivered
            .lock()
            .map(|list| list.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: PlayerNotification) {
        if let Ok(mut list) = self.delivered.lock() {
            list.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        let player_id = PlayerId::new();
        let ticket_id = TicketId::new();

        notifier
            .notify(PlayerNotification::TicketPurchased {
                player_id,
                ticket_id,
                cost: Coins::new(5),
            })
            .await;
        notifier
            .notify(PlayerNotification::TicketExpired {
                player_id,
                ticket_id,
                forfeited_prize: None,
            })
            .await;

        let delivered = notifier.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(matches!(delivered[0], PlayerNotification::TicketPurchased { .. }));
        assert_eq!(delivered[1].player_id(), player_id);
    }

    #[test]
    fn test_notification_json_is_tagged() {
        let json = serde_json::to_value(PlayerNotification::PrizeAwarded {
            player_id: PlayerId::new(),
            ticket_id: TicketId::new(),
            prize: Coins::new(40),
            balance: Coins::new(90),
        })
        .unwrap_or_default();
        assert_eq!(json["type"], "prize_awarded");
        assert_eq!(json["prize"], 40);
    }
}
