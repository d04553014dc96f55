use serde::{Deserialize, Serialize};

use chrono::NaiveDate;

use super::domain::{
    BookingId, BookingStatus, GuestCount, PaymentStatus, StayRange, UnitId,
};
use super::pricing::PriceBreakdown;

/// Repository record for one reservation attempt.
///
/// `status` is lifecycle bookkeeping only; occupancy questions are always
/// answered by the ledger. `occupancy` is fixed at creation time so later
/// transitions release exactly what was reserved. `price` is the quote
/// snapshot captured at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: BookingId,
    pub unit_id: UnitId,
    pub guest_name: String,
    pub stay: StayRange,
    pub occupancy: StayRange,
    pub guests: GuestCount,
    pub status: BookingStatus,
    pub payment: PaymentStatus,
    pub price: PriceBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl BookingRecord {
    pub fn status_view(&self) -> BookingStatusView {
        BookingStatusView {
            booking_id: self.booking_id.clone(),
            unit_id: self.unit_id.clone(),
            status: self.status.label(),
            payment: self.payment.label(),
            check_in: self.stay.check_in(),
            check_out: self.stay.check_out(),
            total: self.price.total(),
            rejection_reason: self.rejection_reason.clone(),
        }
    }
}

/// Sanitized representation of a booking's exposed state.
#[derive(Debug, Clone, Serialize)]
pub struct BookingStatusView {
    pub booking_id: BookingId,
    pub unit_id: UnitId,
    pub status: &'static str,
    pub payment: &'static str,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait BookingRepository: Send + Sync {
    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError>;
    fn update(&self, record: BookingRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError>;
    fn pending(&self, limit: usize) -> Result<Vec<BookingRecord>, RepositoryError>;
    /// Administrative purge of completed records whose stay ended before
    /// `before`. Returns how many records were removed.
    fn purge_completed(&self, before: NaiveDate) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
