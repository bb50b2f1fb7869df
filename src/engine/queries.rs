use std::time::Instant;

use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::{Engine, EngineError, availability, pricing};

impl Engine {
    /// Load a booking, applying the lazy completed-promotion first.
    pub async fn get_booking(&self, id: Ulid, today: Day) -> Result<Booking, EngineError> {
        let mut booking = self.store.load_booking(id).await?;
        self.maybe_complete(&mut booking, today).await?;
        Ok(booking)
    }

    pub async fn list_bookings_by_user(
        &self,
        user_id: Ulid,
        today: Day,
    ) -> Result<Vec<Booking>, EngineError> {
        let mut bookings = self.store.list_by_user(user_id).await?;
        for booking in &mut bookings {
            self.maybe_complete(booking, today).await?;
        }
        Ok(bookings)
    }

    pub async fn list_bookings_by_property(
        &self,
        property_id: Ulid,
        today: Day,
    ) -> Result<Vec<Booking>, EngineError> {
        let mut bookings = self.store.list_by_property(property_id).await?;
        for booking in &mut bookings {
            self.maybe_complete(booking, today).await?;
        }
        Ok(bookings)
    }

    /// Ordered days unavailable on this property: the union across its
    /// linkage group of all days held by pending/confirmed reservations.
    pub async fn booked_dates(&self, property_id: Ulid) -> Result<Vec<Day>, EngineError> {
        let (_, calendar) = self.group_calendar(&property_id)?;
        let guard = calendar.read().await;
        Ok(availability::booked_days(&guard))
    }

    /// Whether the range is free across the property's linkage group. A
    /// positive answer is advisory only — creation re-checks under the
    /// group lock.
    pub async fn is_free(&self, property_id: Ulid, range: &DateRange) -> Result<bool, EngineError> {
        let (_, calendar) = self.group_calendar(&property_id)?;
        let guard = calendar.read().await;
        Ok(availability::is_free(&guard, range))
    }

    /// Price a prospective stay without touching any state.
    pub fn quote(
        &self,
        property_id: Ulid,
        range: &DateRange,
        guests: u32,
        extras: &Extras,
        tier: MembershipTier,
    ) -> Result<PriceBreakdown, EngineError> {
        let started = Instant::now();
        let property = self
            .property(&property_id)
            .ok_or(EngineError::NotFound(property_id))?;
        let breakdown = pricing::quote(property, range, guests, extras, tier)?;
        metrics::histogram!(observability::QUOTE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        Ok(breakdown)
    }
}
