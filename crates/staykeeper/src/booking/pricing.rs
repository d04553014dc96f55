use serde::{Deserialize, Serialize};

use super::domain::{
    GuestCount, InvalidStayRange, ListingKind, PricingPolicy, StayRange, Unit,
};

/// Errors raised while computing a quote.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidStayRange),
    #[error("no {field} configured for {kind} listing")]
    MissingRate {
        kind: ListingKind,
        field: &'static str,
    },
}

/// Itemized quote output. Every intermediate figure is exposed so callers
/// can render a breakdown and tests can assert on each term independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceBreakdown {
    Nightly {
        nightly_rate: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        seasonal_multiplier: Option<f64>,
        extra_per_night: u32,
        total_nights: u32,
        subtotal: u32,
        total: u32,
    },
    Monthly {
        monthly_rate: u32,
        total: u32,
    },
    Sale {
        price: u32,
        total: u32,
    },
}

impl PriceBreakdown {
    pub fn total(&self) -> u32 {
        match self {
            PriceBreakdown::Nightly { total, .. } => *total,
            PriceBreakdown::Monthly { total, .. } => *total,
            PriceBreakdown::Sale { total, .. } => *total,
        }
    }
}

/// Pure quote computation over a unit, a stay, and a guest composition.
///
/// Must produce identical output whenever the same inputs recur: the result
/// is snapshotted onto the booking at creation time and never recomputed.
#[derive(Debug, Clone, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn quote(
        &self,
        unit: &Unit,
        stay: StayRange,
        guests: GuestCount,
        policy: &PricingPolicy,
    ) -> Result<PriceBreakdown, PricingError> {
        match unit.kind {
            ListingKind::ShortTerm => Ok(self.nightly_quote(unit, stay, guests, policy)),
            ListingKind::LongTerm => {
                let monthly_rate = unit.monthly_rate.ok_or(PricingError::MissingRate {
                    kind: unit.kind,
                    field: "monthly rate",
                })?;
                Ok(PriceBreakdown::Monthly {
                    monthly_rate,
                    total: monthly_rate,
                })
            }
            ListingKind::ForSale => {
                let price = unit.sale_price.ok_or(PricingError::MissingRate {
                    kind: unit.kind,
                    field: "sale price",
                })?;
                Ok(PriceBreakdown::Sale {
                    price,
                    total: price,
                })
            }
        }
    }

    fn nightly_quote(
        &self,
        unit: &Unit,
        stay: StayRange,
        guests: GuestCount,
        policy: &PricingPolicy,
    ) -> PriceBreakdown {
        // A seasonal entry only applies when the entire stay sits inside its
        // window; stays straddling a boundary use the base rate throughout.
        // First matching entry wins.
        let seasonal = unit
            .seasonal_rates
            .iter()
            .find(|rate| rate.covers(stay))
            .copied();

        let nightly_rate = match seasonal {
            Some(rate) => (f64::from(unit.daily_rate) * rate.multiplier).round() as u32,
            None => unit.daily_rate,
        };

        let extra_adults = u32::from(guests.adults.saturating_sub(policy.included_adults));
        let extra_children = u32::from(guests.children.saturating_sub(policy.included_children));
        let extra_per_night =
            extra_adults * policy.extra_adult_rate + extra_children * policy.extra_child_rate;

        let total_nights = stay.nights();
        // Saturate rather than overflow on absurd-but-valid date ranges.
        let subtotal = nightly_rate
            .saturating_add(extra_per_night)
            .saturating_mul(total_nights);

        PriceBreakdown::Nightly {
            nightly_rate,
            seasonal_multiplier: seasonal.map(|rate| rate.multiplier),
            extra_per_night,
            total_nights,
            subtotal,
            // No service fee or tax layer; the total stays traceable to its
            // components. A deployment adding one gets its own named line.
            total: subtotal,
        }
    }
}
