use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{BookingId, StayRange, UnitId};

/// Lifecycle events consumed by the notification and dashboard
/// collaborators. The core only emits; delivery is someone else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BookingEvent {
    RequestReceived {
        booking_id: BookingId,
        unit_id: UnitId,
        stay: StayRange,
        /// False when the ledger reported a conflict and the request was
        /// accepted without a hold, for operator follow-up.
        dates_held: bool,
    },
    RequestApproved {
        booking_id: BookingId,
    },
    RequestRejected {
        booking_id: BookingId,
        reason: String,
    },
    BookingCancelled {
        booking_id: BookingId,
    },
    StayCompleted {
        booking_id: BookingId,
        /// Cutoff the release used, when completion reopened only future
        /// dates.
        #[serde(skip_serializing_if = "Option::is_none")]
        released_from: Option<NaiveDate>,
    },
}

/// Outbound event hook (e-mail adapter, dashboard feed, message bus).
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: BookingEvent) -> Result<(), EventError>;
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}
