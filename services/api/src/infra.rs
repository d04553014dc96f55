use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use staykeeper::booking::{
    BookingEvent, BookingId, BookingRecord, BookingRepository, BookingService, BookingStatus,
    CatalogError, EventError, EventPublisher, InMemoryAvailabilityLedger, LifecycleConfig,
    ListingKind, PricingPolicy, RepositoryError, SeasonalRate, Unit, UnitCatalog, UnitId,
};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiService = BookingService<
    SeededUnitCatalog,
    InMemoryBookingRepository,
    InMemoryAvailabilityLedger,
    LoggingEventPublisher,
>;

pub(crate) fn build_service(lifecycle: LifecycleConfig) -> Arc<ApiService> {
    Arc::new(BookingService::new(
        Arc::new(SeededUnitCatalog::with_units(seed_units())),
        Arc::new(InMemoryBookingRepository::default()),
        Arc::new(InMemoryAvailabilityLedger::new()),
        Arc::new(LoggingEventPublisher::default()),
        default_pricing_policy(),
        lifecycle,
    ))
}

/// Catalog stand-in until the real listing service is wired up.
pub(crate) struct SeededUnitCatalog {
    units: HashMap<UnitId, Unit>,
}

impl SeededUnitCatalog {
    pub(crate) fn with_units(units: Vec<Unit>) -> Self {
        Self {
            units: units
                .into_iter()
                .map(|unit| (unit.id.clone(), unit))
                .collect(),
        }
    }
}

impl UnitCatalog for SeededUnitCatalog {
    fn fetch(&self, id: &UnitId) -> Result<Option<Unit>, CatalogError> {
        Ok(self.units.get(id).cloned())
    }
}

// BTreeMap so pending listings page through requests in id order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryBookingRepository {
    records: Arc<Mutex<BTreeMap<BookingId, BookingRecord>>>,
}

impl BookingRepository for InMemoryBookingRepository {
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

/// Publishes lifecycle events to the log and keeps them for the demo and
/// dashboard views; a real deployment swaps in the notification adapter.
#[derive(Default, Clone)]
pub(crate) struct LoggingEventPublisher {
    events: Arc<Mutex<Vec<BookingEvent>>>,
}

impl LoggingEventPublisher {
    pub(crate) fn events(&self) -> Vec<BookingEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventPublisher for LoggingEventPublisher {
    fn publish(&self, event: BookingEvent) -> Result<(), EventError> {
        info!(?event, "booking lifecycle event");
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

pub(crate) fn default_pricing_policy() -> PricingPolicy {
    PricingPolicy {
        included_adults: 2,
        included_children: 1,
        extra_adult_rate: 150,
        extra_child_rate: 100,
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

pub(crate) fn seed_units() -> Vec<Unit> {
    vec![
        Unit {
            id: UnitId("unit-river".to_string()),
            name: "Riverside Cabin".to_string(),
            kind: ListingKind::ShortTerm,
            daily_rate: 1000,
            weekly_rate: Some(6300),
            monthly_rate: None,
            sale_price: None,
            seasonal_rates: vec![SeasonalRate {
                starts_on: seed_date(2025, 12, 20),
                ends_on: seed_date(2026, 1, 5),
                multiplier: 1.5,
            }],
        },
        Unit {
            id: UnitId("unit-loft".to_string()),
            name: "Downtown Loft".to_string(),
            kind: ListingKind::LongTerm,
            daily_rate: 900,
            weekly_rate: None,
            monthly_rate: Some(18500),
            sale_price: None,
            seasonal_rates: Vec::new(),
        },
        Unit {
            id: UnitId("unit-villa".to_string()),
            name: "Hillside Villa".to_string(),
            kind: ListingKind::ForSale,
            daily_rate: 0,
            weekly_rate: None,
            monthly_rate: None,
            sale_price: Some(4_250_000),
            seasonal_rates: Vec::new(),
        },
    ]
}
