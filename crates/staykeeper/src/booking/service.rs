use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::{CatalogError, UnitCatalog};
use super::domain::{
    BookingId, BookingStatus, GuestCount, InvalidStayRange, PaymentStatus, PricingPolicy,
    SlotStatus, StayRange, UnitId,
};
use super::events::{BookingEvent, EventError, EventPublisher};
use super::ledger::{AvailabilityLedger, LedgerError};
use super::pricing::{PriceBreakdown, PricingEngine, PricingError};
use super::repository::{BookingRecord, BookingRepository, RepositoryError};

/// Whether completing a booking early reopens its remaining future dates
/// only, or the whole stay. The source system reopened future dates only;
/// kept as explicit policy rather than hard-coded behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionRelease {
    FutureDatesOnly,
    EntireStay,
}

#[derive(Debug, Clone, Copy)]
pub struct LifecycleConfig {
    pub completion_release: CompletionRelease,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            completion_release: CompletionRelease::FutureDatesOnly,
        }
    }
}

/// Guest-facing booking request payload.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub unit_id: UnitId,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: GuestCount,
}

/// Result of `create`: the stored record plus whether the ledger actually
/// holds the dates. A request that lost the race is still created.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub record: BookingRecord,
    pub dates_held: bool,
}

/// One rendered day of a unit's calendar, with the owning guest for
/// tooltip display.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
}

/// Error raised by the booking lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum BookingServiceError {
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),
    #[error("unknown booking {0}")]
    UnknownBooking(BookingId),
    #[error("cannot {action} a booking in state {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: &'static str,
    },
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Event(#[from] EventError),
}

impl From<InvalidStayRange> for BookingServiceError {
    fn from(value: InvalidStayRange) -> Self {
        Self::Pricing(PricingError::InvalidRange(value))
    }
}

static BOOKING_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_booking_id() -> BookingId {
    let id = BOOKING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BookingId(format!("bkg-{id:06}"))
}

/// State machine over booking records, orchestrating ledger calls and
/// emitting the events external collaborators consume.
pub struct BookingService<C, R, L, E> {
    catalog: Arc<C>,
    repository: Arc<R>,
    ledger: Arc<L>,
    events: Arc<E>,
    engine: PricingEngine,
    policy: PricingPolicy,
    config: LifecycleConfig,
}

impl<C, R, L, E> BookingService<C, R, L, E>
where
    C: UnitCatalog + 'static,
    R: BookingRepository + 'static,
    L: AvailabilityLedger + 'static,
    E: EventPublisher + 'static,
{
    pub fn new(
        catalog: Arc<C>,
        repository: Arc<R>,
        ledger: Arc<L>,
        events: Arc<E>,
        policy: PricingPolicy,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            catalog,
            repository,
            ledger,
            events,
            engine: PricingEngine::new(),
            policy,
            config,
        }
    }

    /// Quote a stay without touching the ledger or the repository.
    pub fn quote(
        &self,
        unit_id: &UnitId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: GuestCount,
    ) -> Result<PriceBreakdown, BookingServiceError> {
        let unit = self
            .catalog
            .fetch(unit_id)?
            .ok_or_else(|| BookingServiceError::UnknownUnit(unit_id.clone()))?;
        let stay = StayRange::new(check_in, check_out)?;
        Ok(self.engine.quote(&unit, stay, guests, &self.policy)?)
    }

    /// Create a pending request: snapshot the price, persist the record,
    /// then try to hold the dates. A ledger conflict does not abort; the
    /// request stands for manual resolution and the conflict is logged.
    pub fn create(&self, request: BookingRequest) -> Result<CreateOutcome, BookingServiceError> {
        let unit = self
            .catalog
            .fetch(&request.unit_id)?
            .ok_or_else(|| BookingServiceError::UnknownUnit(request.unit_id.clone()))?;

        let stay = StayRange::new(request.check_in, request.check_out)?;
        let price = self.engine.quote(&unit, stay, request.guests, &self.policy)?;

        // Every listing kind holds its full period, so overlapping requests
        // conflict no matter where their check-in days fall.
        let occupancy = stay;

        let booking_id = next_booking_id();
        let record = self.repository.insert(BookingRecord {
            booking_id: booking_id.clone(),
            unit_id: unit.id.clone(),
            guest_name: request.guest_name,
            stay,
            occupancy,
            guests: request.guests,
            status: BookingStatus::PendingRequest,
            payment: PaymentStatus::Pending,
            price,
            rejection_reason: None,
        })?;

        let dates_held = match self.ledger.reserve(&unit.id, occupancy, &booking_id) {
            Ok(()) => true,
            Err(LedgerError::Conflict {
                date,
                status,
                holder,
            }) => {
                warn!(
                    booking = %booking_id,
                    unit = %unit.id,
                    %date,
                    %status,
                    conflicting = %holder,
                    "booking request accepted without a hold; dates already taken"
                );
                false
            }
            Err(other) => return Err(other.into()),
        };

        self.events.publish(BookingEvent::RequestReceived {
            booking_id,
            unit_id: unit.id,
            stay,
            dates_held,
        })?;

        Ok(CreateOutcome { record, dates_held })
    }

    /// Operator approval: pending request becomes confirmed and the hold is
    /// materialized in the ledger. A conflict with another booking's dates
    /// aborts with no status change.
    pub fn approve(
        &self,
        booking_id: &BookingId,
        mark_paid: bool,
    ) -> Result<BookingRecord, BookingServiceError> {
        let mut record = self.fetch(booking_id)?;
        if record.status != BookingStatus::PendingRequest {
            return Err(BookingServiceError::InvalidTransition {
                from: record.status,
                action: "approve",
            });
        }

        self.ledger
            .confirm(&record.unit_id, record.occupancy, booking_id)?;

        record.status = BookingStatus::Confirmed;
        if mark_paid {
            record.payment = PaymentStatus::Completed;
        }
        self.repository.update(record.clone())?;

        self.events.publish(BookingEvent::RequestApproved {
            booking_id: booking_id.clone(),
        })?;
        Ok(record)
    }

    /// Operator rejection: pending request becomes cancelled and every held
    /// date is returned to the pool.
    pub fn reject(
        &self,
        booking_id: &BookingId,
        reason: String,
    ) -> Result<BookingRecord, BookingServiceError> {
        let mut record = self.fetch(booking_id)?;
        if record.status != BookingStatus::PendingRequest {
            return Err(BookingServiceError::InvalidTransition {
                from: record.status,
                action: "reject",
            });
        }

        self.ledger
            .release(&record.unit_id, record.occupancy, booking_id, None)?;

        record.status = BookingStatus::Cancelled;
        record.rejection_reason = Some(reason.clone());
        self.repository.update(record.clone())?;

        self.events.publish(BookingEvent::RequestRejected {
            booking_id: booking_id.clone(),
            reason,
        })?;
        Ok(record)
    }

    /// Cancel a confirmed booking, reopening its whole date range. No
    /// penalty logic lives here.
    pub fn cancel(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingServiceError> {
        let mut record = self.fetch(booking_id)?;
        if record.status != BookingStatus::Confirmed {
            return Err(BookingServiceError::InvalidTransition {
                from: record.status,
                action: "cancel",
            });
        }

        self.ledger
            .release(&record.unit_id, record.occupancy, booking_id, None)?;

        record.status = BookingStatus::Cancelled;
        self.repository.update(record.clone())?;

        self.events.publish(BookingEvent::BookingCancelled {
            booking_id: booking_id.clone(),
        })?;
        Ok(record)
    }

    /// Close out a confirmed stay. Past dates the booking already consumed
    /// stay on the books; whether remaining future dates reopen is governed
    /// by the configured completion policy.
    pub fn complete(
        &self,
        booking_id: &BookingId,
        today: NaiveDate,
    ) -> Result<BookingRecord, BookingServiceError> {
        let mut record = self.fetch(booking_id)?;
        if record.status != BookingStatus::Confirmed {
            return Err(BookingServiceError::InvalidTransition {
                from: record.status,
                action: "complete",
            });
        }

        let cutoff = match self.config.completion_release {
            CompletionRelease::FutureDatesOnly => Some(today),
            CompletionRelease::EntireStay => None,
        };
        self.ledger
            .release(&record.unit_id, record.occupancy, booking_id, cutoff)?;

        record.status = BookingStatus::Completed;
        self.repository.update(record.clone())?;

        self.events.publish(BookingEvent::StayCompleted {
            booking_id: booking_id.clone(),
            released_from: cutoff,
        })?;
        Ok(record)
    }

    /// Record out-of-band payment. Orthogonal to the lifecycle: never moves
    /// the booking status, and re-marking is a no-op.
    pub fn mark_paid(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingServiceError> {
        let mut record = self.fetch(booking_id)?;
        if record.payment != PaymentStatus::Completed {
            record.payment = PaymentStatus::Completed;
            self.repository.update(record.clone())?;
        }
        Ok(record)
    }

    /// Fetch a booking for API responses.
    pub fn get(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingServiceError> {
        self.fetch(booking_id)
    }

    /// Per-day status grid for `[from, to)`, joined with guest names for
    /// tooltip display.
    pub fn calendar(
        &self,
        unit_id: &UnitId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarDay>, BookingServiceError> {
        self.catalog
            .fetch(unit_id)?
            .ok_or_else(|| BookingServiceError::UnknownUnit(unit_id.clone()))?;

        let slots = self.ledger.query(unit_id, from, to);
        let mut guests: HashMap<BookingId, Option<String>> = HashMap::new();

        let mut days = Vec::with_capacity(slots.len());
        for slot in slots {
            let guest = match &slot.booking {
                Some(owner) => {
                    if !guests.contains_key(owner) {
                        let name = self
                            .repository
                            .fetch(owner)?
                            .map(|record| record.guest_name);
                        guests.insert(owner.clone(), name);
                    }
                    guests.get(owner).cloned().flatten()
                }
                None => None,
            };
            days.push(CalendarDay {
                date: slot.date,
                status: slot.status,
                booking_id: slot.booking,
                guest,
            });
        }
        Ok(days)
    }

    /// Pending requests awaiting an operator decision.
    pub fn pending(&self, limit: usize) -> Result<Vec<BookingRecord>, BookingServiceError> {
        Ok(self.repository.pending(limit)?)
    }

    /// Administrative purge of old completed records.
    pub fn purge_completed(&self, before: NaiveDate) -> Result<usize, BookingServiceError> {
        Ok(self.repository.purge_completed(before)?)
    }

    fn fetch(&self, booking_id: &BookingId) -> Result<BookingRecord, BookingServiceError> {
        self.repository
            .fetch(booking_id)?
            .ok_or_else(|| BookingServiceError::UnknownBooking(booking_id.clone()))
    }
}
