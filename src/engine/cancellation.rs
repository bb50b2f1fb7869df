use crate::model::*;

use super::pricing::cashback_amount;

/// Minimum full days of notice before check-in. Uniform across tiers.
pub const MIN_NOTICE_DAYS: i64 = 2;

pub fn days_until_check_in(check_in: Day, today: Day) -> i64 {
    check_in - today
}

/// A booking can be cancelled while it still holds dates and at least two
/// full days remain before check-in. Inside the window the policy is binary:
/// no cancellation at all rather than a reduced refund.
pub fn can_cancel(booking: &Booking, today: Day) -> bool {
    booking.status.holds_dates()
        && days_until_check_in(booking.range.check_in, today) >= MIN_NOTICE_DAYS
}

/// Refund for a cancellable booking. Callers check [`can_cancel`] first.
///
/// A pending booking was never debited, so cancelling it moves no money.
/// A confirmed booking refunds the full total, and the cashback credited at
/// confirmation is clawed back in full.
pub fn compute_refund(booking: &Booking, today: Day) -> RefundBreakdown {
    let days = days_until_check_in(booking.range.check_in, today);
    match booking.status {
        BookingStatus::Confirmed => RefundBreakdown {
            refund_amount: booking.price.total,
            cashback_deducted: cashback_amount(booking.price.total, booking.tier),
            days_until_check_in: days,
        },
        _ => RefundBreakdown {
            refund_amount: 0,
            cashback_deducted: 0,
            days_until_check_in: days,
        },
    }
}
