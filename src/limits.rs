//! Guard limits on inputs. These are sanity bounds, not business rules:
//! anything past them is rejected with `LimitExceeded` before it can bloat
//! a calendar or overflow price arithmetic.

use crate::model::Day;

/// 1970-01-01.
pub const MIN_VALID_DAY: Day = 0;

/// Roughly year 2170.
pub const MAX_VALID_DAY: Day = 73_048;

/// Longest accepted stay.
pub const MAX_STAY_NIGHTS: i64 = 365;

/// Largest accepted party, standard and excess guests combined.
pub const MAX_GUESTS: u32 = 64;

/// Most sauna hours purchasable on a single booking.
pub const MAX_SAUNA_HOURS: u32 = 24;

/// Property catalog cap.
pub const MAX_PROPERTIES: usize = 10_000;

/// Reservations held per linkage group.
pub const MAX_RESERVATIONS_PER_GROUP: usize = 100_000;
