//! The availability-and-booking engine: per-unit date-slot ledger, the
//! booking lifecycle state machine that mutates it, and the price
//! computation snapshotted onto every request.

pub mod catalog;
pub mod domain;
pub mod events;
pub mod ledger;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, UnitCatalog};
pub use domain::{
    BookingId, BookingStatus, DateSlot, GuestCount, InvalidStayRange, ListingKind, PaymentStatus,
    PricingPolicy, SeasonalRate, SlotStatus, StayRange, Unit, UnitId,
};
pub use events::{BookingEvent, EventError, EventPublisher};
pub use ledger::{AvailabilityLedger, InMemoryAvailabilityLedger, LedgerError};
pub use pricing::{PriceBreakdown, PricingEngine, PricingError};
pub use repository::{BookingRecord, BookingRepository, BookingStatusView, RepositoryError};
pub use router::booking_router;
pub use service::{
    BookingRequest, BookingService, BookingServiceError, CalendarDay, CompletionRelease,
    CreateOutcome, LifecycleConfig,
};
