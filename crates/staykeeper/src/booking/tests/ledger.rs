use std::sync::Arc;
use std::thread;

use super::common::date;
use crate::booking::domain::{BookingId, SlotStatus, StayRange, UnitId};
use crate::booking::ledger::{AvailabilityLedger, InMemoryAvailabilityLedger, LedgerError};

fn unit() -> UnitId {
    UnitId("unit-river".to_string())
}

fn booking(suffix: &str) -> BookingId {
    BookingId(format!("bkg-{suffix}"))
}

fn range(from: u32, to: u32) -> StayRange {
    StayRange::new(date(2025, 8, from), date(2025, 8, to)).expect("valid range")
}

#[test]
fn reserve_holds_every_night_of_the_range() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("reserve succeeds");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 14));
    assert_eq!(slots.len(), 4);
    for slot in &slots[..3] {
        assert_eq!(slot.status, SlotStatus::Held);
        assert_eq!(slot.booking.as_ref(), Some(&booking("a")));
    }
    // Checkout day is not occupied by the stay.
    assert_eq!(slots[3].status, SlotStatus::Available);
    assert_eq!(slots[3].booking, None);
}

#[test]
fn conflicting_reserve_fails_without_partial_mutation() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("first reserve succeeds");

    let before = ledger.query(&unit(), date(2025, 8, 8), date(2025, 8, 16));
    match ledger.reserve(&unit(), range(12, 15), &booking("b")) {
        Err(LedgerError::Conflict { date: day, holder, .. }) => {
            assert_eq!(day, date(2025, 8, 12));
            assert_eq!(holder, booking("a"));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    let after = ledger.query(&unit(), date(2025, 8, 8), date(2025, 8, 16));

    assert_eq!(before, after, "failed reserve must leave no trace");
}

#[test]
fn reserve_is_idempotent_for_the_same_booking() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("first reserve succeeds");
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("re-reserve is a no-op success");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));
    assert!(slots.iter().all(|slot| slot.status == SlotStatus::Held));
}

#[test]
fn confirm_promotes_holds_and_is_idempotent() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("reserve succeeds");

    ledger
        .confirm(&unit(), range(10, 13), &booking("a"))
        .expect("confirm succeeds");
    ledger
        .confirm(&unit(), range(10, 13), &booking("a"))
        .expect("re-confirm is a no-op success");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));
    assert!(slots
        .iter()
        .all(|slot| slot.status == SlotStatus::Confirmed
            && slot.booking.as_ref() == Some(&booking("a"))));
}

#[test]
fn confirm_materialises_dates_that_were_never_held() {
    let ledger = InMemoryAvailabilityLedger::new();
    // No reserve first: the hold was lost to a conflict that later resolved.
    ledger
        .confirm(&unit(), range(10, 13), &booking("a"))
        .expect("confirm creates confirmed slots directly");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));
    assert!(slots.iter().all(|slot| slot.status == SlotStatus::Confirmed));
}

#[test]
fn confirm_over_foreign_dates_fails_whole_without_mutation() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(12, 14), &booking("a"))
        .expect("reserve succeeds");

    let before = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 15));
    match ledger.confirm(&unit(), range(10, 14), &booking("b")) {
        Err(LedgerError::Conflict { holder, .. }) => assert_eq!(holder, booking("a")),
        other => panic!("expected conflict, got {other:?}"),
    }
    let after = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 15));

    assert_eq!(before, after);
}

#[test]
fn release_reopens_every_owned_date() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("reserve succeeds");
    ledger
        .confirm(&unit(), range(10, 13), &booking("a"))
        .expect("confirm succeeds");

    ledger
        .release(&unit(), range(10, 13), &booking("a"), None)
        .expect("release succeeds");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));
    assert!(slots
        .iter()
        .all(|slot| slot.status == SlotStatus::Available && slot.booking.is_none()));
}

#[test]
fn release_twice_matches_release_once() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("reserve succeeds");

    ledger
        .release(&unit(), range(10, 13), &booking("a"), None)
        .expect("first release succeeds");
    let once = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));

    ledger
        .release(&unit(), range(10, 13), &booking("a"), None)
        .expect("second release is a no-op success");
    let twice = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 13));

    assert_eq!(once, twice);
}

#[test]
fn release_with_cutoff_keeps_past_dates_on_the_books() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .confirm(&unit(), range(10, 14), &booking("a"))
        .expect("confirm succeeds");

    ledger
        .release(&unit(), range(10, 14), &booking("a"), Some(date(2025, 8, 12)))
        .expect("release succeeds");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 14));
    assert_eq!(slots[0].status, SlotStatus::Confirmed);
    assert_eq!(slots[1].status, SlotStatus::Confirmed);
    assert_eq!(slots[2].status, SlotStatus::Available);
    assert_eq!(slots[3].status, SlotStatus::Available);
}

#[test]
fn release_never_touches_foreign_slots() {
    let ledger = InMemoryAvailabilityLedger::new();
    ledger
        .reserve(&unit(), range(10, 12), &booking("a"))
        .expect("reserve succeeds");
    ledger
        .reserve(&unit(), range(12, 14), &booking("b"))
        .expect("adjacent reserve succeeds");

    ledger
        .release(&unit(), range(10, 14), &booking("a"), None)
        .expect("release succeeds");

    let slots = ledger.query(&unit(), date(2025, 8, 12), date(2025, 8, 14));
    assert!(slots
        .iter()
        .all(|slot| slot.booking.as_ref() == Some(&booking("b"))));
}

#[test]
fn units_never_contend_with_each_other() {
    let ledger = InMemoryAvailabilityLedger::new();
    let other = UnitId("unit-loft".to_string());

    ledger
        .reserve(&unit(), range(10, 13), &booking("a"))
        .expect("reserve on first unit succeeds");
    ledger
        .reserve(&other, range(10, 13), &booking("b"))
        .expect("same dates on another unit succeed");
}

#[test]
fn query_reports_unmapped_days_as_available() {
    let ledger = InMemoryAvailabilityLedger::new();
    let slots = ledger.query(&unit(), date(2025, 8, 1), date(2025, 8, 4));

    assert_eq!(slots.len(), 3);
    assert!(slots
        .iter()
        .all(|slot| slot.status == SlotStatus::Available && slot.booking.is_none()));
}

#[test]
fn racing_overlapping_reserves_admit_exactly_one_winner() {
    let ledger = Arc::new(InMemoryAvailabilityLedger::new());

    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|name| {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.reserve(&unit(), range(10, 15), &booking(name)))
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("reserve thread panicked"))
        .collect();

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1, "exactly one overlapping reserve may win");

    let slots = ledger.query(&unit(), date(2025, 8, 10), date(2025, 8, 15));
    let owners: Vec<_> = slots.iter().filter_map(|slot| slot.booking.clone()).collect();
    assert_eq!(owners.len(), 5);
    assert!(owners.windows(2).all(|pair| pair[0] == pair[1]));
}
