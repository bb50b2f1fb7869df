use async_trait::async_trait;
use dashmap::DashMap;
use ulid::Ulid;

use crate::model::*;

#[derive(Debug)]
pub enum StoreError {
    NotFound(Ulid),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "not found: {id}"),
            StoreError::Unavailable(e) => write!(f, "store unavailable: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Persistence boundary. The engine needs exactly these operations; what
/// technology sits behind them is the embedder's business. The engine treats
/// failures as transient and leaves no partial booking state behind them.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// The property catalog with linkage records, read once at startup to
    /// build the linkage partition.
    async fn load_properties(&self) -> Result<Vec<Property>, StoreError>;

    /// Bookings still holding dates (pending or confirmed), replayed at
    /// startup to rebuild the availability calendars.
    async fn load_active_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    /// Upsert by booking id.
    async fn save_booking(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn load_booking(&self, id: Ulid) -> Result<Booking, StoreError>;

    async fn list_by_user(&self, user_id: Ulid) -> Result<Vec<Booking>, StoreError>;

    async fn list_by_property(&self, property_id: Ulid) -> Result<Vec<Booking>, StoreError>;
}

/// Reference store used by the test suite and by embedders without a
/// database.
#[derive(Default)]
pub struct InMemoryStore {
    properties: DashMap<Ulid, Property>,
    bookings: DashMap<Ulid, Booking>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            properties: DashMap::new(),
            bookings: DashMap::new(),
        }
    }

    pub fn add_property(&self, property: Property) {
        self.properties.insert(property.id, property);
    }

    fn collect_sorted(&self, mut matching: Vec<Booking>) -> Vec<Booking> {
        // Ulids sort by creation time, so this is insertion order.
        matching.sort_by_key(|b| b.id);
        matching
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn load_properties(&self) -> Result<Vec<Property>, StoreError> {
        let mut properties: Vec<Property> =
            self.properties.iter().map(|e| e.value().clone()).collect();
        properties.sort_by_key(|p| p.id);
        Ok(properties)
    }

    async fn load_active_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        Ok(self.collect_sorted(
            self.bookings
                .iter()
                .filter(|e| e.value().status.holds_dates())
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn save_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        self.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn load_booking(&self, id: Ulid) -> Result<Booking, StoreError> {
        self.bookings
            .get(&id)
            .map(|e| e.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_by_user(&self, user_id: Ulid) -> Result<Vec<Booking>, StoreError> {
        Ok(self.collect_sorted(
            self.bookings
                .iter()
                .filter(|e| e.value().user_id == user_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }

    async fn list_by_property(&self, property_id: Ulid) -> Result<Vec<Booking>, StoreError> {
        Ok(self.collect_sorted(
            self.bookings
                .iter()
                .filter(|e| e.value().property_id == property_id)
                .map(|e| e.value().clone())
                .collect(),
        ))
    }
}
