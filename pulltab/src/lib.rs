//! Pull-tab ticket engine.
//!
//! Players spend coins on virtual pull-tab tickets, reveal tabs one by one or
//! all at once, and claim the prize of a winning ticket. Tickets that are not
//! finished within their lifetime expire and forfeit any prize.
//!
//! # Architecture
//!
//! ```text
//!  HTTP (axum)            Service shell                     Domain core
//! ┌────────────┐   ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  api::*    │──▶│ PullTabService           │──▶│ TicketReducer            │
//! │ extractors │   │  BEGIN                   │   │  validate → events       │
//! └────────────┘   │  lock wallet, ticket     │   │  apply → state           │
//!                  │  reduce                  │◀──│  effects (notifications) │
//! ┌────────────┐   │  persist + audit, COMMIT │   └──────────────────────────┘
//! │ Expiry     │──▶│  run effects             │   ┌──────────────────────────┐
//! │ sweeper    │   └──────────────────────────┘   │ generator (RNG → tabs)   │
//! └────────────┘                │                 └──────────────────────────┘
//!                               ▼
//!                         PostgreSQL
//! ```
//!
//! # Key Rules
//!
//! - A ticket holds at most one winning tab, drawn with the design's win
//!   probability and a prize between its minimum and maximum.
//! - Balances never go negative; a purchase re-checks the balance under the
//!   wallet row lock.
//! - A prize is paid at most once, enforced by the reducer and by a unique
//!   ledger index.
//! - Unrevealed tab values never leave the server.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod notify;
pub mod persistence;
pub mod server;
pub mod service;
pub mod sweeper;
pub mod types;

pub use aggregates::{TicketAction, TicketEnvironment, TicketReducer, TicketState};
pub use config::Config;
pub use error::PullTabError;
pub use service::{PullTabService, ServiceError, ServiceResult};
pub use types::*;
