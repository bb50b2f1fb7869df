use ulid::Ulid;

use crate::ledger::LedgerError;
use crate::model::{BookingStatus, Day, Money};

use super::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// Checkout must fall strictly after check-in.
    InvalidRange { check_in: Day, check_out: Day },
    /// A booking needs at least one guest.
    InvalidGuestCount(u32),
    InvalidExtra(&'static str),
    /// The requested range is taken somewhere in the property's linkage
    /// group. Recoverable by picking different dates.
    Unavailable {
        property_id: Ulid,
        conflicting_booking: Ulid,
    },
    /// A reservation raced against this one and won. Retryable; never fatal.
    Conflict(Ulid),
    NotFound(Ulid),
    AlreadyExists(Ulid),
    /// The booking's status does not admit the requested transition.
    InvalidTransition {
        booking_id: Ulid,
        status: BookingStatus,
    },
    /// Cancellation window has closed, or the booking is already terminal.
    /// Carries the notice period so callers can explain why.
    NotCancellable {
        booking_id: Ulid,
        days_until_check_in: i64,
    },
    /// Prepaid balance cannot cover the charge. Recoverable by top-up.
    InsufficientFunds { balance: Money, required: Money },
    LimitExceeded(&'static str),
    /// Transient persistence failure; no partial booking state remains.
    Storage(String),
    /// Transient ledger failure other than a declined debit.
    Ledger(String),
}

impl EngineError {
    /// Whether retrying the same request could succeed without the caller
    /// changing anything (boundary hiccups, lost races).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::Conflict(_) | EngineError::Storage(_) | EngineError::Ledger(_)
        )
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidRange {
                check_in,
                check_out,
            } => write!(f, "invalid range: checkout {check_out} not after check-in {check_in}"),
            EngineError::InvalidGuestCount(n) => write!(f, "invalid guest count: {n}"),
            EngineError::InvalidExtra(what) => write!(f, "invalid extra: {what}"),
            EngineError::Unavailable {
                property_id,
                conflicting_booking,
            } => write!(
                f,
                "dates not available on property {property_id} (held by booking {conflicting_booking})"
            ),
            EngineError::Conflict(id) => write!(f, "dates no longer available: lost to {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::InvalidTransition { booking_id, status } => {
                write!(f, "booking {booking_id} is {status:?}; transition not allowed")
            }
            EngineError::NotCancellable {
                booking_id,
                days_until_check_in,
            } => write!(
                f,
                "booking {booking_id} not cancellable ({days_until_check_in} days until check-in)"
            ),
            EngineError::InsufficientFunds { balance, required } => {
                write!(f, "insufficient balance: have {balance}, need {required}")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Storage(e) => write!(f, "storage error: {e}"),
            EngineError::Ledger(e) => write!(f, "ledger error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::Unavailable(msg) => EngineError::Storage(msg),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds { balance, required } => {
                EngineError::InsufficientFunds { balance, required }
            }
            other => EngineError::Ledger(other.to_string()),
        }
    }
}
