use crate::limits::*;
use crate::model::*;

use super::EngineError;

/// Flat fee per guest beyond the property's standard maximum.
pub const EXTRA_GUEST_RATE: Money = 150;

/// Hourly sauna rate before the tier discount.
pub const SAUNA_HOURLY_RATE: Money = 250;

/// Flat kitchenware fee for tiers that don't include it.
pub const KITCHENWARE_FEE: Money = 100;

/// Round half away from zero on a value carrying two implicit percent
/// digits. The engine's single rounding rule: applied once at the end of
/// each percentage computation, never on intermediate terms.
fn round_percent(numerator: i64) -> Money {
    if numerator >= 0 {
        (numerator + 50) / 100
    } else {
        (numerator - 50) / 100
    }
}

/// Itemized price for a stay. Pure and deterministic: same inputs, same
/// breakdown, no clock and no state.
pub fn quote(
    property: &Property,
    range: &DateRange,
    guests: u32,
    extras: &Extras,
    tier: MembershipTier,
) -> Result<PriceBreakdown, EngineError> {
    if guests == 0 {
        return Err(EngineError::InvalidGuestCount(guests));
    }
    if guests > MAX_GUESTS {
        return Err(EngineError::LimitExceeded("guest count"));
    }
    if extras.sauna_hours > MAX_SAUNA_HOURS {
        return Err(EngineError::InvalidExtra("sauna hours"));
    }
    if range.nights() > MAX_STAY_NIGHTS {
        return Err(EngineError::LimitExceeded("stay too long"));
    }

    let nights = range.nights();
    let base = property.nightly_rate * nights;
    let extra_guests = guests.saturating_sub(property.max_guests) as i64;
    let extra_guest_fee = extra_guests * EXTRA_GUEST_RATE;
    let sauna_fee = sauna_fee(extras.sauna_hours, tier);
    let kitchenware_fee = if extras.kitchenware && !tier.kitchenware_free() {
        KITCHENWARE_FEE
    } else {
        0
    };

    let total = base + extra_guest_fee + sauna_fee + kitchenware_fee;
    Ok(PriceBreakdown {
        nights,
        base,
        extra_guest_fee,
        sauna_fee,
        kitchenware_fee,
        total,
    })
}

/// Tiers with the first-hour-free benefit pay the discounted rate only on
/// hours past the first.
fn sauna_fee(hours: u32, tier: MembershipTier) -> Money {
    let billable = if tier.first_sauna_hour_free() {
        hours.saturating_sub(1)
    } else {
        hours
    } as i64;
    round_percent(billable * SAUNA_HOURLY_RATE * (100 - tier.sauna_discount_percent() as i64))
}

/// Cashback earned when a booking of this total is confirmed. Same rounding
/// rule as the fees.
pub fn cashback_amount(total: Money, tier: MembershipTier) -> Money {
    round_percent(total * tier.cashback_percent() as i64)
}
