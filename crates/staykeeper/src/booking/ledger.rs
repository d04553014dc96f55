use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use super::domain::{BookingId, DateSlot, SlotStatus, StayRange, UnitId};

/// Errors raised by ledger mutations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("{date} is already {status} by booking {holder}")]
    Conflict {
        date: NaiveDate,
        status: SlotStatus,
        holder: BookingId,
    },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Authoritative per-unit calendar of date-slots.
///
/// This is the only source of truth for occupancy; booking records never
/// answer "is this date free". Each mutation is all-or-nothing over the
/// half-open date set it names, and operations on different units never
/// contend with each other.
pub trait AvailabilityLedger: Send + Sync {
    /// Hold every date of `range` for `booking`. Fails with `Conflict` and
    /// mutates nothing if any date is already owned by another booking.
    fn reserve(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
    ) -> Result<(), LedgerError>;

    /// Promote this booking's holds to confirmed, materializing confirmed
    /// slots directly for dates it never managed to hold. Idempotent; fails
    /// whole with `Conflict` if any date belongs to a different booking.
    fn confirm(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
    ) -> Result<(), LedgerError>;

    /// Return every date owned by this booking to available, clearing the
    /// owner. With a cutoff only dates at or after it are reopened; earlier
    /// dates stay as historical record. Idempotent.
    fn release(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
        cutoff: Option<NaiveDate>,
    ) -> Result<(), LedgerError>;

    /// Read-only snapshot of `[from, to)` for calendar rendering; unmapped
    /// days report available with no owner.
    fn query(&self, unit: &UnitId, from: NaiveDate, to: NaiveDate) -> Vec<DateSlot>;
}

type UnitCalendar = Arc<Mutex<BTreeMap<NaiveDate, DateSlot>>>;

/// In-process ledger backed by a sparse map of occupied slots per unit.
///
/// The per-unit mutex is the serialization point that makes reserve's
/// check-then-act atomic: the lock is held across both the availability
/// scan and the writes, so two overlapping reservations can never both
/// observe "available".
#[derive(Default)]
pub struct InMemoryAvailabilityLedger {
    units: Mutex<HashMap<UnitId, UnitCalendar>>,
}

impl InMemoryAvailabilityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn calendar(&self, unit: &UnitId) -> UnitCalendar {
        let mut units = self.units.lock().expect("ledger unit map mutex poisoned");
        units
            .entry(unit.clone())
            .or_insert_with(|| Arc::new(Mutex::new(BTreeMap::new())))
            .clone()
    }
}

fn foreign_owner(
    slots: &BTreeMap<NaiveDate, DateSlot>,
    range: StayRange,
    booking: &BookingId,
) -> Option<(NaiveDate, SlotStatus, BookingId)> {
    range.dates().find_map(|date| {
        slots.get(&date).and_then(|slot| match &slot.booking {
            Some(owner) if owner != booking => Some((date, slot.status, owner.clone())),
            _ => None,
        })
    })
}

impl AvailabilityLedger for InMemoryAvailabilityLedger {
    fn reserve(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
    ) -> Result<(), LedgerError> {
        let calendar = self.calendar(unit);
        let mut slots = calendar.lock().expect("ledger calendar mutex poisoned");

        if let Some((date, status, holder)) = foreign_owner(&slots, range, booking) {
            return Err(LedgerError::Conflict {
                date,
                status,
                holder,
            });
        }

        for date in range.dates() {
            // Re-reserving a range this booking already occupies is a no-op;
            // confirmed slots are not downgraded back to held.
            slots.entry(date).or_insert_with(|| DateSlot {
                date,
                status: SlotStatus::Held,
                booking: Some(booking.clone()),
            });
        }
        Ok(())
    }

    fn confirm(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
    ) -> Result<(), LedgerError> {
        let calendar = self.calendar(unit);
        let mut slots = calendar.lock().expect("ledger calendar mutex poisoned");

        if let Some((date, status, holder)) = foreign_owner(&slots, range, booking) {
            return Err(LedgerError::Conflict {
                date,
                status,
                holder,
            });
        }

        for date in range.dates() {
            slots.insert(
                date,
                DateSlot {
                    date,
                    status: SlotStatus::Confirmed,
                    booking: Some(booking.clone()),
                },
            );
        }
        Ok(())
    }

    fn release(
        &self,
        unit: &UnitId,
        range: StayRange,
        booking: &BookingId,
        cutoff: Option<NaiveDate>,
    ) -> Result<(), LedgerError> {
        let calendar = self.calendar(unit);
        let mut slots = calendar.lock().expect("ledger calendar mutex poisoned");

        for date in range.dates() {
            if let Some(floor) = cutoff {
                if date < floor {
                    continue;
                }
            }
            let owned = slots
                .get(&date)
                .map(|slot| slot.booking.as_ref() == Some(booking))
                .unwrap_or(false);
            if owned {
                slots.remove(&date);
            }
        }
        Ok(())
    }

    fn query(&self, unit: &UnitId, from: NaiveDate, to: NaiveDate) -> Vec<DateSlot> {
        let calendar = self.calendar(unit);
        let slots = calendar.lock().expect("ledger calendar mutex poisoned");

        from.iter_days()
            .take_while(|date| *date < to)
            .map(|date| {
                slots
                    .get(&date)
                    .cloned()
                    .unwrap_or_else(|| DateSlot::available(date))
            })
            .collect()
    }
}
