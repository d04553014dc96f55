use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for listed units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for booking requests. Ordered so listings over the
/// zero-padded sequence ids come out in creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    ShortTerm,
    LongTerm,
    ForSale,
}

impl ListingKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::LongTerm => "long-term",
            Self::ForSale => "for-sale",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Date-range-scoped multiplier over the base nightly rate.
///
/// The window is half-open: a stay is covered only when the whole of
/// `[check_in, check_out)` falls inside `[starts_on, ends_on)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRate {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub multiplier: f64,
}

impl SeasonalRate {
    pub fn covers(&self, stay: StayRange) -> bool {
        stay.check_in >= self.starts_on && stay.check_out <= self.ends_on
    }
}

/// A rentable (or sellable) listed property as the catalog exposes it.
///
/// Only the pricing fields matter to this crate; occupancy is never read
/// from the unit itself, the ledger owns that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub kind: ListingKind,
    pub daily_rate: u32,
    pub weekly_rate: Option<u32>,
    pub monthly_rate: Option<u32>,
    pub sale_price: Option<u32>,
    #[serde(default)]
    pub seasonal_rates: Vec<SeasonalRate>,
}

/// Guest composition without any protected-class detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCount {
    pub adults: u8,
    pub children: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("check-out {check_out} must fall after check-in {check_in}")]
pub struct InvalidStayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Half-open stay interval: check-in inclusive, check-out exclusive.
///
/// The checkout day itself is never occupied by the stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, InvalidStayRange> {
        if check_out <= check_in {
            return Err(InvalidStayRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.check_in && date < self.check_out
    }

    pub fn overlaps(&self, other: StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Every occupied day of the stay, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let check_out = self.check_out;
        self.check_in
            .iter_days()
            .take_while(move |date| *date < check_out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Held,
    Confirmed,
}

impl SlotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Held => "held",
            Self::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One calendar day's occupancy record for one unit.
///
/// Invariant: a non-available slot always names its owning booking, and an
/// available slot never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSlot {
    pub date: NaiveDate,
    pub status: SlotStatus,
    pub booking: Option<BookingId>,
}

impl DateSlot {
    pub fn available(date: NaiveDate) -> Self {
        Self {
            date,
            status: SlotStatus::Available,
            booking: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingRequest,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PendingRequest => "pending_request",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Orthogonal payment flag; recorded out-of-band and never a driver of the
/// booking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Process-wide pricing knobs owned by the settings collaborator.
///
/// Always passed explicitly into the quote path so pricing stays
/// deterministic under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub included_adults: u8,
    pub included_children: u8,
    pub extra_adult_rate: u32,
    pub extra_child_rate: u32,
}
