use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::booking::catalog::{CatalogError, UnitCatalog};
use crate::booking::domain::{
    BookingId, BookingStatus, GuestCount, ListingKind, PricingPolicy, SeasonalRate, Unit, UnitId,
};
use crate::booking::events::{BookingEvent, EventError, EventPublisher};
use crate::booking::ledger::InMemoryAvailabilityLedger;
use crate::booking::repository::{BookingRecord, BookingRepository, RepositoryError};
use crate::booking::service::{BookingRequest, BookingService, LifecycleConfig};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn policy() -> PricingPolicy {
    PricingPolicy {
        included_adults: 2,
        included_children: 1,
        extra_adult_rate: 150,
        extra_child_rate: 100,
    }
}

pub(super) fn short_term_unit() -> Unit {
    Unit {
        id: UnitId("unit-river".to_string()),
        name: "Riverside Cabin".to_string(),
        kind: ListingKind::ShortTerm,
        daily_rate: 1000,
        weekly_rate: Some(6300),
        monthly_rate: None,
        sale_price: None,
        seasonal_rates: vec![SeasonalRate {
            starts_on: date(2025, 12, 20),
            ends_on: date(2026, 1, 5),
            multiplier: 1.5,
        }],
    }
}

pub(super) fn long_term_unit() -> Unit {
    Unit {
        id: UnitId("unit-loft".to_string()),
        name: "Downtown Loft".to_string(),
        kind: ListingKind::LongTerm,
        daily_rate: 900,
        weekly_rate: None,
        monthly_rate: Some(18500),
        sale_price: None,
        seasonal_rates: Vec::new(),
    }
}

pub(super) fn for_sale_unit() -> Unit {
    Unit {
        id: UnitId("unit-villa".to_string()),
        name: "Hillside Villa".to_string(),
        kind: ListingKind::ForSale,
        daily_rate: 0,
        weekly_rate: None,
        monthly_rate: None,
        sale_price: Some(4_250_000),
        seasonal_rates: Vec::new(),
    }
}

pub(super) fn request(unit: &Unit, check_in: NaiveDate, check_out: NaiveDate) -> BookingRequest {
    BookingRequest {
        unit_id: unit.id.clone(),
        guest_name: "Amara Osei".to_string(),
        check_in,
        check_out,
        guests: GuestCount {
            adults: 2,
            children: 0,
        },
    }
}

#[derive(Default)]
pub(super) struct StaticCatalog {
    units: HashMap<UnitId, Unit>,
}

impl StaticCatalog {
    pub(super) fn with_units(units: Vec<Unit>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|unit| (unit.id.clone(), unit))
                .collect(),
        }
    }
}

impl UnitCatalog for StaticCatalog {
    fn fetch(&self, id: &UnitId) -> Result<Option<Unit>, CatalogError> {
        Ok(self.units.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<BTreeMap<BookingId, BookingRecord>>>,
}

impl BookingRepository for MemoryRepository {
    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.booking_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.booking_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: BookingRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.booking_id) {
            guard.insert(record.booking_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn pending(&self, limit: usize) -> Result<Vec<BookingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status == BookingStatus::PendingRequest)
            .take(limit)
            .cloned()
            .collect())
    }

    fn purge_completed(&self, before: NaiveDate) -> Result<usize, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let doomed: Vec<BookingId> = guard
            .values()
            .filter(|record| {
                record.status == BookingStatus::Completed && record.stay.check_out() < before
            })
            .map(|record| record.booking_id.clone())
            .collect();
        for id in &doomed {
            guard.remove(id);
        }
        Ok(doomed.len())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<BookingEvent>>>,
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<BookingEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for MemoryEvents {
    fn publish(&self, event: BookingEvent) -> Result<(), EventError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl BookingRepository for UnavailableRepository {
    fn insert(&self, _record: BookingRecord) -> Result<BookingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: BookingRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<BookingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn purge_completed(&self, _before: NaiveDate) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) type TestService =
    BookingService<StaticCatalog, MemoryRepository, InMemoryAvailabilityLedger, MemoryEvents>;

pub(super) struct Fixture {
    pub(super) service: Arc<TestService>,
    pub(super) repository: MemoryRepository,
    pub(super) ledger: Arc<InMemoryAvailabilityLedger>,
    pub(super) events: MemoryEvents,
}

pub(super) fn fixture(units: Vec<Unit>) -> Fixture {
    fixture_with_config(units, LifecycleConfig::default())
}

pub(super) fn fixture_with_config(units: Vec<Unit>, config: LifecycleConfig) -> Fixture {
    let repository = MemoryRepository::default();
    let ledger = Arc::new(InMemoryAvailabilityLedger::new());
    let events = MemoryEvents::default();
    let service = Arc::new(BookingService::new(
        Arc::new(StaticCatalog::with_units(units)),
        Arc::new(repository.clone()),
        ledger.clone(),
        Arc::new(events.clone()),
        policy(),
        config,
    ));
    Fixture {
        service,
        repository,
        ledger,
        events,
    }
}
