mod availability;
mod cancellation;
mod error;
mod linkage;
mod mutations;
mod pricing;
mod queries;
mod store;

pub use availability::{booked_days, find_conflict, is_free, reserve};
pub use cancellation::{MIN_NOTICE_DAYS, can_cancel, compute_refund, days_until_check_in};
pub use error::EngineError;
pub use linkage::LinkageGroups;
pub use pricing::{EXTRA_GUEST_RATE, KITCHENWARE_FEE, SAUNA_HOURLY_RATE, cashback_amount, quote};
pub use store::{BookingStore, InMemoryStore, StoreError};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use ulid::Ulid;

use crate::ledger::LoyaltyLedger;
use crate::limits::MAX_PROPERTIES;
use crate::model::*;

pub type SharedCalendar = Arc<RwLock<GroupCalendar>>;

/// The booking lifecycle orchestrator.
///
/// Holds the property catalog, the precomputed linkage partition, and one
/// shared calendar per linkage group. The group's write lock is the only
/// critical section in the engine: it covers the free-check and the
/// reservation insert, so two racing requests for overlapping dates
/// serialize and exactly one wins.
pub struct Engine {
    properties: HashMap<Ulid, Property>,
    groups: LinkageGroups,
    /// Indexed by linkage-group id. Fixed after startup.
    calendars: Vec<SharedCalendar>,
    pub(super) store: Arc<dyn BookingStore>,
    pub(super) ledger: Arc<dyn LoyaltyLedger>,
}

impl Engine {
    /// Load the catalog, build the linkage partition, and rebuild every
    /// group calendar by replaying the store's active bookings. The
    /// calendars are derived state; the store stays the source of truth.
    pub async fn new(
        store: Arc<dyn BookingStore>,
        ledger: Arc<dyn LoyaltyLedger>,
    ) -> Result<Self, EngineError> {
        let catalog = store.load_properties().await?;
        if catalog.len() > MAX_PROPERTIES {
            return Err(EngineError::LimitExceeded("too many properties"));
        }

        let groups = LinkageGroups::build(&catalog);
        let calendars: Vec<SharedCalendar> = (0..groups.group_count())
            .map(|_| Arc::new(RwLock::new(GroupCalendar::new())))
            .collect();
        let properties: HashMap<Ulid, Property> =
            catalog.into_iter().map(|p| (p.id, p)).collect();

        let engine = Self {
            properties,
            groups,
            calendars,
            store,
            ledger,
        };

        // Replay — we're the sole owner of these Arcs during startup, so
        // try_write always succeeds instantly.
        for booking in engine.store.load_active_bookings().await? {
            if !booking.status.holds_dates() {
                continue;
            }
            let (_, calendar) = engine.group_calendar(&booking.property_id)?;
            let mut guard = calendar.try_write().expect("replay: uncontended write");
            guard.insert(Reservation {
                booking_id: booking.id,
                property_id: booking.property_id,
                range: booking.range,
            });
        }

        Ok(engine)
    }

    pub fn property(&self, id: &Ulid) -> Option<&Property> {
        self.properties.get(id)
    }

    pub fn list_properties(&self) -> Vec<Property> {
        let mut catalog: Vec<Property> = self.properties.values().cloned().collect();
        catalog.sort_by_key(|p| p.id);
        catalog
    }

    /// Properties sharing the given property's calendar, itself included.
    pub fn linkage_group(&self, property_id: &Ulid) -> Option<&[Ulid]> {
        self.groups
            .group_of(property_id)
            .map(|g| self.groups.members(g))
    }

    /// Linkage-group id and shared calendar for a property.
    pub(super) fn group_calendar(
        &self,
        property_id: &Ulid,
    ) -> Result<(usize, SharedCalendar), EngineError> {
        let group = self
            .groups
            .group_of(property_id)
            .ok_or(EngineError::NotFound(*property_id))?;
        Ok((group, self.calendars[group].clone()))
    }
}
