//! Background expiry of tickets whose lifetime has ended.
//!
//! The sweeper wakes every interval, asks the service to expire one batch of
//! due tickets, and stops when the shutdown broadcast fires. A failed sweep
//! is logged and the next tick tries again.

use crate::service::PullTabService;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

/// Periodic ticket expiry task.
pub struct ExpirySweeper {
    service: PullTabService,
    interval: Duration,
    batch_size: i64,
    shutdown: broadcast::Receiver<()>,
}

impl ExpirySweeper {
    /// Create a sweeper.
    ///
    /// # Arguments
    ///
    /// * `service` - Service used to expire tickets
    /// * `interval` - Delay between sweeps
    /// * `batch_size` - Maximum tickets expired per sweep
    /// * `shutdown` - Stops the loop when a value is sent or the sender drops
    #[must_use]
    pub const fn new(
        service: PullTabService,
        interval: Duration,
        batch_size: i64,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            service,
            interval,
            batch_size,
            shutdown,
        }
    }

    /// Spawn the sweeper as a background task.
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until shutdown.
    pub async fn run(mut self) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            batch_size = self.batch_size,
            "Expiry sweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Expiry sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// Run a single sweep, returning how many tickets were expired.
    pub async fn sweep_once(&self) -> usize {
        match self.service.expire_due(self.batch_size).await {
            Ok(0) => {
                tracing::trace!("No tickets due for expiry");
                0
            },
            Ok(expired) => {
                tracing::info!(expired, "Expired tickets");
                expired
            },
            Err(error) => {
                tracing::error!(%error, "Expiry sweep failed");
                0
            },
        }
    }
}
