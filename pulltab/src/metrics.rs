//! Business metrics for the pull-tab engine.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `pulltab_tickets_purchased_total` - Tickets sold
//! - `pulltab_tabs_revealed_total` - Tabs pulled
//! - `pulltab_prizes_claimed_total` - Prizes paid out
//! - `pulltab_prize_payout_coins_total` - Coins paid out as prizes
//! - `pulltab_tickets_expired_total` - Tickets closed by the sweeper
//! - `pulltab_rejections_total{reason}` - Commands rejected by validation
//!
//! ## Histograms
//! - `pulltab_command_duration_seconds{command}` - Time from load to commit

use metrics::{describe_counter, describe_histogram};
use std::time::Duration;

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "pulltab_tickets_purchased_total",
        "Total number of tickets purchased"
    );
    describe_counter!(
        "pulltab_tabs_revealed_total",
        "Total number of tabs revealed"
    );
    describe_counter!(
        "pulltab_prizes_claimed_total",
        "Total number of prizes claimed"
    );
    describe_counter!(
        "pulltab_prize_payout_coins_total",
        "Total coins paid out as prizes"
    );
    describe_counter!(
        "pulltab_tickets_expired_total",
        "Total number of tickets expired"
    );
    describe_counter!(
        "pulltab_rejections_total",
        "Total number of rejected commands by reason"
    );
    describe_histogram!(
        "pulltab_command_duration_seconds",
        "Time taken to load, reduce and commit one command"
    );

    tracing::info!("Business metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a ticket purchase.
pub fn record_ticket_purchased() {
    metrics::counter!("pulltab_tickets_purchased_total").increment(1);
}

/// Record revealed tabs.
pub fn record_tabs_revealed(count: usize) {
    metrics::counter!("pulltab_tabs_revealed_total").increment(count as u64);
}

/// Record a prize payout.
pub fn record_prize_claimed(prize: u64) {
    metrics::counter!("pulltab_prizes_claimed_total").increment(1);
    metrics::counter!("pulltab_prize_payout_coins_total").increment(prize);
}

/// Record an expired ticket.
pub fn record_ticket_expired() {
    metrics::counter!("pulltab_tickets_expired_total").increment(1);
}

/// Record a rejected command.
pub fn record_rejection(reason: &'static str) {
    metrics::counter!("pulltab_rejections_total", "reason" => reason).increment(1);
}

/// Record how long a command took end to end.
pub fn record_command_duration(command: &'static str, duration: Duration) {
    metrics::histogram!("pulltab_command_duration_seconds", "command" => command)
        .record(duration.as_secs_f64());
}
