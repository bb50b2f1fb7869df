//! hearth — availability and pricing engine for small property rentals.
//!
//! Guests reserve date ranges on properties whose calendars may be linked
//! (a whole-venue listing shares its calendar with every sub-unit), pay from
//! a prepaid loyalty balance with tier-dependent pricing, and receive
//! tier-dependent refunds on cancellation.
//!
//! The engine owns the booking state machine and the derived availability
//! calendars; persistence and the money ledger sit behind the
//! [`engine::BookingStore`] and [`ledger::LoyaltyLedger`] traits.

pub mod engine;
pub mod ledger;
pub mod limits;
pub mod model;
pub mod observability;

pub use engine::{Engine, EngineError};
