//! Reservation records and the occupied-interval model.
//!
//! Reservations arrive as immutable snapshots from the booking layer; this
//! module only derives data from them. The central derivation is
//! [`Reservation::occupied_interval`]: the time window during which a
//! reservation holds fleet capacity, including the mandatory turnaround
//! buffer after its nominal end.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::warn;

use crate::interval::TimeInterval;
use crate::{generate_id, Id};

/// Mandatory turnaround appended after every reservation's nominal end.
///
/// Gear coming back from the water needs rinsing and re-racking before it can
/// go out again, so the occupied window is always one hour longer than the
/// rented duration.
pub const SERVICE_BUFFER: Duration = Duration::hours(1);

/// Lifecycle state of a reservation.
///
/// Only the pre-use and in-use states hold capacity; terminal states release
/// it. Snapshots from the booking layer may carry states this crate does not
/// know about; those deserialize as [`Unknown`](ReservationStatus::Unknown)
/// and never block capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReservationStatus {
    Booked,
    PendingConfirmation,
    Confirmed,
    InUse,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
    /// Unrecognized lifecycle state carried by an external snapshot.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl ReservationStatus {
    /// Returns true for states that will never hold capacity again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::NoShow | Self::Rescheduled
        )
    }
}

/// Kind of service a reservation books.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ServiceCategory {
    Rental,
    Excursion,
}

/// Resources a reservation consumes, resolved once at the ingestion boundary.
///
/// Modern records carry an explicit type-id → quantity map; older records
/// only know three discrete counts. When a record carries both, the map is
/// authoritative and ingestion must produce `Modern`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResourceSelection {
    /// Explicit selection: resource type id → quantity.
    Modern(BTreeMap<Id, u32>),
    /// Discrete legacy counts, fallback only.
    Legacy {
        boards: u32,
        boards_with_seat: u32,
        rafts: u32,
    },
}

impl ResourceSelection {
    /// Builds a modern selection from (type id, quantity) pairs.
    pub fn from_quantities<I, K>(quantities: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<Id>,
    {
        Self::Modern(
            quantities
                .into_iter()
                .map(|(id, qty)| (id.into(), qty))
                .collect(),
        )
    }

    /// Builds a legacy selection from the three discrete counts.
    pub fn from_legacy_counts(boards: u32, boards_with_seat: u32, rafts: u32) -> Self {
        Self::Legacy {
            boards,
            boards_with_seat,
            rafts,
        }
    }
}

/// A booking-layer reservation record.
///
/// Immutable from this crate's point of view: the engine reads snapshots and
/// recomputes every derived value per query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reservation {
    pub id: Id,
    /// Display label for the booking client.
    pub client: String,
    pub category: ServiceCategory,
    /// Start the client booked.
    pub planned_start: DateTime<Utc>,
    /// Actual handover time, set once the gear goes out.
    pub actual_start: Option<DateTime<Utc>>,
    /// Rented duration in hours, exclusive of the service buffer.
    pub duration_hours: f64,
    pub status: ReservationStatus,
    pub selection: ResourceSelection,
}

impl Reservation {
    /// Creates a reservation with a generated id and `Booked` status.
    pub fn new(
        client: impl Into<String>,
        category: ServiceCategory,
        planned_start: DateTime<Utc>,
        duration_hours: f64,
        selection: ResourceSelection,
    ) -> Self {
        Self {
            id: generate_id(),
            client: client.into(),
            category,
            planned_start,
            actual_start: None,
            duration_hours,
            status: ReservationStatus::Booked,
            selection,
        }
    }

    /// Rented duration plus the service buffer, as a chrono duration.
    fn occupied_duration(&self) -> Duration {
        Duration::seconds((self.duration_hours * 3600.0).round() as i64) + SERVICE_BUFFER
    }

    /// Start instant that anchors the occupied window: the actual handover
    /// for in-use reservations that recorded one, otherwise the planned start.
    pub fn effective_start(&self) -> DateTime<Utc> {
        match (self.status, self.actual_start) {
            (ReservationStatus::InUse, Some(actual)) => actual,
            _ => self.planned_start,
        }
    }

    /// Derives the window during which this reservation holds capacity.
    ///
    /// Returns `None` for terminal states, for in-use records missing their
    /// actual start, for unrecognized states, and for non-positive durations.
    /// Every `None` means "does not block capacity": a malformed record can
    /// only ever free up a slot, never occupy one.
    pub fn occupied_interval(&self) -> Option<TimeInterval> {
        if self.duration_hours <= 0.0 {
            warn!(
                reservation = %self.id,
                duration_hours = self.duration_hours,
                "skipping reservation with non-positive duration"
            );
            return None;
        }

        match self.status {
            ReservationStatus::Booked
            | ReservationStatus::PendingConfirmation
            | ReservationStatus::Confirmed => Some(TimeInterval::starting_at(
                self.planned_start,
                self.occupied_duration(),
            )),
            ReservationStatus::InUse => match self.actual_start {
                Some(actual) => Some(TimeInterval::starting_at(actual, self.occupied_duration())),
                None => {
                    warn!(
                        reservation = %self.id,
                        "in-use reservation has no actual start; treating as non-occupying"
                    );
                    None
                }
            },
            ReservationStatus::Completed
            | ReservationStatus::Cancelled
            | ReservationStatus::NoShow
            | ReservationStatus::Rescheduled => None,
            ReservationStatus::Unknown => {
                warn!(
                    reservation = %self.id,
                    "unrecognized reservation status; treating as non-occupying"
                );
                None
            }
        }
    }
}
