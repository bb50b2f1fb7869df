use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::engine::EngineError;

/// Calendar days since the Unix epoch — the only date type.
pub type Day = i64;

/// Whole currency units.
pub type Money = i64;

/// Inclusive day-granularity stay. The guest occupies the property through
/// the night before `check_out`, so `nights = check_out - check_in`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub check_in: Day,
    pub check_out: Day,
}

impl DateRange {
    pub fn new(check_in: Day, check_out: Day) -> Result<Self, EngineError> {
        if check_out <= check_in {
            return Err(EngineError::InvalidRange { check_in, check_out });
        }
        Ok(Self { check_in, check_out })
    }

    pub fn nights(&self) -> i64 {
        self.check_out - self.check_in
    }

    /// Inclusive on both ends: a checkout day equal to another range's
    /// check-in day conflicts. No same-day turnover.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.check_in <= other.check_out && other.check_in <= self.check_out
    }

    pub fn contains(&self, day: Day) -> bool {
        self.check_in <= day && day <= self.check_out
    }

    /// Calendar days from check-in through check-out, lazily.
    pub fn days(self) -> std::ops::RangeInclusive<Day> {
        self.check_in..=self.check_out
    }
}

/// Optional paid add-ons to a booking. Sauna hours are priced per tier;
/// kitchenware is a flat fee waived for tiers that include it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    pub sauna_hours: u32,
    pub kitchenware: bool,
}

/// Membership level. Ordering matters: each tier's benefits dominate the
/// previous one's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MembershipTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl MembershipTier {
    /// Percentage of the booking total credited back on confirmation.
    pub fn cashback_percent(&self) -> u32 {
        match self {
            MembershipTier::Bronze => 10,
            MembershipTier::Silver => 15,
            MembershipTier::Gold => 20,
            MembershipTier::Platinum => 25,
        }
    }

    /// Discount applied to the hourly sauna rate.
    pub fn sauna_discount_percent(&self) -> u32 {
        match self {
            MembershipTier::Bronze => 0,
            MembershipTier::Silver => 10,
            MembershipTier::Gold => 25,
            MembershipTier::Platinum => 40,
        }
    }

    pub fn first_sauna_hour_free(&self) -> bool {
        matches!(self, MembershipTier::Gold | MembershipTier::Platinum)
    }

    pub fn kitchenware_free(&self) -> bool {
        matches!(self, MembershipTier::Platinum)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: Ulid,
    pub name: Option<String>,
    /// Base rate per night.
    pub nightly_rate: Money,
    /// Standard guest count; every guest beyond it pays the flat excess fee.
    pub max_guests: u32,
    /// Properties whose calendars share availability with this one.
    /// May be recorded one-sided; the linkage partition closes the relation
    /// symmetrically and transitively at startup.
    pub linked: Vec<Ulid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// Created, unpaid. Holds its dates.
    Pending,
    /// Paid, balance debited, cashback credited. Holds its dates.
    Confirmed,
    /// Stay ended. Terminal.
    Completed,
    /// Refunded and released. Terminal.
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its date range.
    pub fn holds_dates(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Itemized price. Callers display these terms as-is rather than recomputing
/// sub-totals, so the displayed amount and the charged amount cannot drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub nights: i64,
    pub base: Money,
    pub extra_guest_fee: Money,
    pub sauna_fee: Money,
    pub kitchenware_fee: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundBreakdown {
    pub refund_amount: Money,
    pub cashback_deducted: Money,
    pub days_until_check_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub property_id: Ulid,
    pub user_id: Ulid,
    pub range: DateRange,
    pub guests: u32,
    pub extras: Extras,
    /// Tier at booking time. The cancellation clawback reverses the cashback
    /// earned under this tier, not the user's current one.
    pub tier: MembershipTier,
    pub price: PriceBreakdown,
    pub status: BookingStatus,
}

/// One calendar entry derived from a pending or confirmed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub booking_id: Ulid,
    pub property_id: Ulid,
    pub range: DateRange,
}

/// Derived reservation state for one linkage group, sorted by check-in.
/// This is a cache over the booking store: it must always be rebuildable by
/// replaying the store's pending/confirmed bookings.
#[derive(Debug, Clone, Default)]
pub struct GroupCalendar {
    pub reservations: Vec<Reservation>,
}

impl GroupCalendar {
    pub fn new() -> Self {
        Self {
            reservations: Vec::new(),
        }
    }

    /// Insert maintaining sort order by check-in.
    pub fn insert(&mut self, reservation: Reservation) {
        let pos = self
            .reservations
            .binary_search_by_key(&reservation.range.check_in, |r| r.range.check_in)
            .unwrap_or_else(|e| e);
        self.reservations.insert(pos, reservation);
    }

    /// Remove the reservation for a booking. Idempotent: returns `None` if
    /// nothing was held.
    pub fn release(&mut self, booking_id: Ulid) -> Option<Reservation> {
        if let Some(pos) = self
            .reservations
            .iter()
            .position(|r| r.booking_id == booking_id)
        {
            Some(self.reservations.remove(pos))
        } else {
            None
        }
    }

    /// Reservations whose range overlaps the query window (inclusive ends).
    /// Binary search skips everything checking in after `query.check_out`.
    pub fn overlapping(&self, query: &DateRange) -> impl Iterator<Item = &Reservation> {
        let right_bound = self
            .reservations
            .partition_point(|r| r.range.check_in <= query.check_out);
        self.reservations[..right_bound]
            .iter()
            .filter(move |r| r.range.check_out >= query.check_in)
    }
}
