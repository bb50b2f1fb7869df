use tracing::{debug, error, info};
use ulid::Ulid;

use crate::ledger::LedgerError;
use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::store::StoreError;
use super::{Engine, EngineError, availability, cancellation, pricing};

fn validate_range_bounds(range: &DateRange) -> Result<(), EngineError> {
    if range.check_in < MIN_VALID_DAY || range.check_out > MAX_VALID_DAY {
        return Err(EngineError::LimitExceeded("date out of range"));
    }
    Ok(())
}

impl Engine {
    /// Create a booking in `pending` status, holding its dates.
    ///
    /// Validation and pricing happen before the group lock; the free-check,
    /// the store write, and the reservation insert happen under it. A failed
    /// store write leaves the calendar untouched, and a conflict leaves no
    /// booking record.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_booking(
        &self,
        id: Ulid,
        property_id: Ulid,
        user_id: Ulid,
        range: DateRange,
        guests: u32,
        extras: Extras,
        tier: MembershipTier,
    ) -> Result<Booking, EngineError> {
        validate_range_bounds(&range)?;
        // A store outage must not look like a free id.
        match self.store.load_booking(id).await {
            Ok(_) => return Err(EngineError::AlreadyExists(id)),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        let property = self
            .property(&property_id)
            .ok_or(EngineError::NotFound(property_id))?;
        let price = pricing::quote(property, &range, guests, &extras, tier)?;

        let (_, calendar) = self.group_calendar(&property_id)?;
        let mut guard = calendar.write().await;
        if guard.reservations.len() >= MAX_RESERVATIONS_PER_GROUP {
            return Err(EngineError::LimitExceeded("too many reservations in group"));
        }
        if let Some(conflicting) = availability::find_conflict(&guard, &range) {
            metrics::counter!(observability::BOOKING_CONFLICTS_TOTAL).increment(1);
            return Err(EngineError::Unavailable {
                property_id,
                conflicting_booking: conflicting,
            });
        }

        let booking = Booking {
            id,
            property_id,
            user_id,
            range,
            guests,
            extras,
            tier,
            price,
            status: BookingStatus::Pending,
        };
        self.store.save_booking(&booking).await?;
        availability::reserve(
            &mut guard,
            Reservation {
                booking_id: id,
                property_id,
                range,
            },
        )
        .expect("group lock held since the free check");
        drop(guard);

        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(booking = %id, property = %property_id, "booking created");
        Ok(booking)
    }

    /// Debit the total from the guest's prepaid balance and confirm.
    ///
    /// A declined debit leaves the booking `pending` and keeps the
    /// reservation — the guest gets a grace window to top up and retry.
    /// On success the tier cashback goes to the ledger as its own entry.
    pub async fn confirm_payment(&self, booking_id: Ulid) -> Result<Booking, EngineError> {
        let mut booking = self.store.load_booking(booking_id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(EngineError::InvalidTransition {
                booking_id,
                status: booking.status,
            });
        }

        let reason = format!("booking {booking_id}");
        if let Err(e) = self
            .ledger
            .debit(booking.user_id, booking.price.total, &reason)
            .await
        {
            if matches!(e, LedgerError::InsufficientFunds { .. }) {
                metrics::counter!(observability::PAYMENT_DECLINED_TOTAL).increment(1);
                debug!(booking = %booking_id, "payment declined, reservation kept");
            }
            return Err(e.into());
        }

        booking.status = BookingStatus::Confirmed;
        if let Err(e) = self.store.save_booking(&booking).await {
            // The debit landed but the status did not; reverse it so a retry
            // starts from a clean slate instead of debiting twice.
            let reversal = format!("reversal booking {booking_id}");
            if let Err(credit_err) = self
                .ledger
                .credit(booking.user_id, booking.price.total, &reversal)
                .await
            {
                error!(
                    booking = %booking_id,
                    amount = booking.price.total,
                    %credit_err,
                    "debit stranded: status write and reversal both failed"
                );
            }
            return Err(e.into());
        }

        let cashback = pricing::cashback_amount(booking.price.total, booking.tier);
        if cashback > 0 {
            self.ledger
                .credit_cashback(booking.user_id, cashback)
                .await?;
        }

        metrics::counter!(observability::BOOKINGS_CONFIRMED_TOTAL).increment(1);
        info!(booking = %booking_id, cashback, "booking confirmed");
        Ok(booking)
    }

    /// Cancel a pending or confirmed booking, refund per policy, and free
    /// the dates.
    ///
    /// Cancelling twice fails the second time with `NotCancellable` and
    /// moves no money. The status flip commits before the refund: a ledger
    /// failure after it surfaces as an error with the booking already
    /// cancelled, so the missing credit is reconciled by the caller rather
    /// than re-run through a retry.
    pub async fn cancel_booking(
        &self,
        booking_id: Ulid,
        today: Day,
    ) -> Result<RefundBreakdown, EngineError> {
        let mut booking = self.store.load_booking(booking_id).await?;
        self.maybe_complete(&mut booking, today).await?;

        if !cancellation::can_cancel(&booking, today) {
            return Err(EngineError::NotCancellable {
                booking_id,
                days_until_check_in: cancellation::days_until_check_in(
                    booking.range.check_in,
                    today,
                ),
            });
        }

        let refund = cancellation::compute_refund(&booking, today);
        let was_confirmed = booking.status == BookingStatus::Confirmed;

        // Persist the terminal status before moving any money: a retry after
        // a ledger failure then hits NotCancellable instead of crediting the
        // refund a second time.
        booking.status = BookingStatus::Cancelled;
        self.store.save_booking(&booking).await?;

        let (_, calendar) = self.group_calendar(&booking.property_id)?;
        if calendar.write().await.release(booking_id).is_none() {
            debug!(booking = %booking_id, "no reservation to release");
        }

        if was_confirmed {
            let reason = format!("refund booking {booking_id}");
            if let Err(e) = self
                .ledger
                .credit(booking.user_id, refund.refund_amount, &reason)
                .await
            {
                error!(
                    booking = %booking_id,
                    amount = refund.refund_amount,
                    "refund credit failed after cancellation; needs reconciliation"
                );
                return Err(e.into());
            }
            if refund.cashback_deducted > 0
                && let Err(e) = self
                    .ledger
                    .debit_cashback(booking.user_id, refund.cashback_deducted)
                    .await
            {
                error!(
                    booking = %booking_id,
                    amount = refund.cashback_deducted,
                    "cashback clawback failed after cancellation; needs reconciliation"
                );
                return Err(e.into());
            }
        }

        metrics::counter!(observability::BOOKINGS_CANCELLED_TOTAL).increment(1);
        info!(
            booking = %booking_id,
            refund = refund.refund_amount,
            clawback = refund.cashback_deducted,
            "booking cancelled"
        );
        Ok(refund)
    }

    /// Promote a confirmed booking whose stay has ended. Bookkeeping only:
    /// idempotent, irreversible, never touches price or ledger. Runs lazily
    /// on every read path.
    pub(super) async fn maybe_complete(
        &self,
        booking: &mut Booking,
        today: Day,
    ) -> Result<bool, EngineError> {
        if booking.status != BookingStatus::Confirmed || today <= booking.range.check_out {
            return Ok(false);
        }

        booking.status = BookingStatus::Completed;
        self.store.save_booking(booking).await?;
        let (_, calendar) = self.group_calendar(&booking.property_id)?;
        calendar.write().await.release(booking.id);

        metrics::counter!(observability::BOOKINGS_COMPLETED_TOTAL).increment(1);
        debug!(booking = %booking.id, "booking completed");
        Ok(true)
    }
}
