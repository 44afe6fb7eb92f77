//! Aggregate reducers for the pull-tab engine.
//!
//! - Ticket: purchase, reveal, claim and expiry of a single ticket, together
//!   with the owner's wallet

pub mod ticket;

pub use ticket::{TicketAction, TicketEnvironment, TicketReducer, TicketState};
