//! Sweep extension with conflict attribution and worst-period tracking.

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::interval::TimeInterval;
use crate::reservation::Reservation;
use crate::Id;

use super::{event_points, occupied_snapshot, requested_window, OccupiedEntry};

/// A reservation contributing to occupancy somewhere in the queried window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conflict {
    pub reservation_id: Id,
    pub client: String,
    pub interval: TimeInterval,
    pub primary_units: u32,
    pub accessory_units: u32,
}

/// The sub-interval with the least remaining primary capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorstPeriod {
    pub at: DateTime<Utc>,
    pub remaining_primary: i64,
    pub remaining_accessory: i64,
}

/// Structured availability report for warning banners.
///
/// The primary and accessory pools are swept independently: accessories do
/// not gate the shared slot pool, so each figure is the minimum of its own
/// pool over the window. Callers combine them per bundle rules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetailedAvailability {
    /// Remaining primary units at the worst instant; may be negative.
    pub available_primary: i64,
    /// Remaining accessory units at the worst instant; may be negative.
    pub available_accessory: i64,
    /// Every reservation contributing occupancy in the window, in
    /// first-encountered order.
    pub conflicts: Vec<Conflict>,
    /// Worst sub-interval by remaining primary capacity; `None` when no
    /// reservation holds primary capacity anywhere in the window.
    pub worst_period: Option<WorstPeriod>,
}

impl DetailedAvailability {
    /// Whether a request for the given bundle fits at every instant of the
    /// window. Negative pool figures are clamped before comparison, matching
    /// the caller-facing display invariant.
    pub fn can_accommodate(&self, requested_primary: u32, requested_accessory: u32) -> bool {
        self.available_primary.max(0) >= i64::from(requested_primary)
            && self.available_accessory.max(0) >= i64::from(requested_accessory)
    }
}

fn pool_occupancy_at<F>(occupied: &[OccupiedEntry<'_>], instant: DateTime<Utc>, units: F) -> u32
where
    F: Fn(&OccupiedEntry<'_>) -> u32,
{
    occupied
        .iter()
        .filter(|entry| entry.interval.contains(instant))
        .map(units)
        .sum()
}

/// Sweeps one pool, returning its maximum occupancy and the probe instant
/// where it occurred.
fn sweep_pool<F>(
    requested: &TimeInterval,
    occupied: &[OccupiedEntry<'_>],
    points: &[DateTime<Utc>],
    units: F,
) -> (u32, Option<DateTime<Utc>>)
where
    F: Fn(&OccupiedEntry<'_>) -> u32,
{
    if points.len() < 2 {
        let sum: u32 = occupied.iter().map(&units).sum();
        let at = (sum > 0).then(|| requested.start());
        return (sum, at);
    }

    let mut max_occupancy = 0u32;
    let mut worst_at = None;
    let mut consider = |instant: DateTime<Utc>| {
        let occupancy = pool_occupancy_at(occupied, instant, &units);
        if occupancy > max_occupancy || (worst_at.is_none() && occupancy > 0) {
            max_occupancy = max_occupancy.max(occupancy);
            worst_at = Some(instant);
        }
    };
    for pair in points.windows(2) {
        consider(pair[0]);
    }
    consider(requested.start());
    (max_occupancy, worst_at)
}

/// Runs the full dual-pool analysis over a candidate window.
///
/// Same event-point technique as [`available_capacity`](super::available_capacity),
/// run once per pool, with every contributing reservation recorded as a
/// [`Conflict`] and the globally worst primary probe captured as the
/// [`WorstPeriod`].
pub fn detailed_availability(
    requested_start: DateTime<Utc>,
    requested_duration_hours: f64,
    reservations: &[Reservation],
    catalog: &Catalog,
    total_capacity: u32,
    total_accessory: u32,
    exclude: Option<&str>,
) -> DetailedAvailability {
    let requested = requested_window(requested_start, requested_duration_hours);
    let occupied = occupied_snapshot(&requested, reservations, catalog, exclude);
    let points = event_points(&requested, &occupied);

    let (primary_peak, primary_worst_at) =
        sweep_pool(&requested, &occupied, &points, |e| e.usage.primary_units);
    let (accessory_peak, _) =
        sweep_pool(&requested, &occupied, &points, |e| e.usage.accessory_units);

    // Entries admitted only by the closed-bounds test (abutting the window)
    // never hold capacity at any probe, so they are not conflicts, except in
    // the degenerate fallback where the direct sum counted them.
    let swept = points.len() >= 2;
    let conflicts = occupied
        .iter()
        .filter(|e| !swept || e.interval.overlaps(&requested))
        .filter(|e| e.usage.primary_units > 0 || e.usage.accessory_units > 0)
        .map(|e| Conflict {
            reservation_id: e.reservation.id.clone(),
            client: e.reservation.client.clone(),
            interval: e.interval,
            primary_units: e.usage.primary_units,
            accessory_units: e.usage.accessory_units,
        })
        .collect();

    let available_primary = i64::from(total_capacity) - i64::from(primary_peak);
    let available_accessory = i64::from(total_accessory) - i64::from(accessory_peak);

    let worst_period = primary_worst_at.map(|at| WorstPeriod {
        at,
        remaining_primary: i64::from(total_capacity)
            - i64::from(pool_occupancy_at(&occupied, at, |e| e.usage.primary_units)),
        remaining_accessory: i64::from(total_accessory)
            - i64::from(pool_occupancy_at(&occupied, at, |e| e.usage.accessory_units)),
    });

    DetailedAvailability {
        available_primary,
        available_accessory,
        conflicts,
        worst_period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceType;
    use crate::reservation::{ResourceSelection, ServiceCategory};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 14, hour, 0, 0).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_iter([
            ResourceType::gating("board", 1),
            ResourceType::accessory("paddle"),
        ])
    }

    fn reservation(client: &str, start_hour: u32, boards: u32, paddles: u32) -> Reservation {
        Reservation::new(
            client,
            ServiceCategory::Rental,
            at(start_hour),
            2.0,
            ResourceSelection::from_quantities([("board", boards), ("paddle", paddles)]),
        )
    }

    #[test]
    fn conflict_free_window() {
        let info = detailed_availability(at(9), 2.0, &[], &catalog(), 10, 20, None);
        assert_eq!(info.available_primary, 10);
        assert_eq!(info.available_accessory, 20);
        assert!(info.conflicts.is_empty());
        assert!(info.worst_period.is_none());
        assert!(info.can_accommodate(10, 20));
    }

    #[test]
    fn pools_are_swept_independently() {
        // Boards peak at 10:00-12:00, paddles peak with the other booking.
        let reservations = vec![
            reservation("Ana", 10, 4, 1),
            reservation("Ben", 13, 1, 6),
        ];
        let info = detailed_availability(at(9), 8.0, &reservations, &catalog(), 10, 8, None);
        assert_eq!(info.available_primary, 6);
        assert_eq!(info.available_accessory, 2);
        assert_eq!(info.conflicts.len(), 2);
    }

    #[test]
    fn worst_period_points_at_peak_occupancy() {
        let reservations = vec![reservation("Ana", 10, 4, 0), reservation("Ben", 11, 3, 0)];
        let info = detailed_availability(at(9), 8.0, &reservations, &catalog(), 10, 0, None);
        // Overlap 11:00-13:00 holds 7 units.
        let worst = info.worst_period.unwrap();
        assert_eq!(worst.at, at(11));
        assert_eq!(worst.remaining_primary, 3);
        assert_eq!(info.available_primary, 3);
    }

    #[test]
    fn conflicts_carry_attribution() {
        let reservations = vec![reservation("Ana", 10, 2, 3)];
        let info = detailed_availability(at(9), 4.0, &reservations, &catalog(), 10, 10, None);
        let conflict = &info.conflicts[0];
        assert_eq!(conflict.client, "Ana");
        assert_eq!(conflict.primary_units, 2);
        assert_eq!(conflict.accessory_units, 3);
        assert_eq!(conflict.interval, TimeInterval::new(at(10), at(13)));
    }

    #[test]
    fn can_accommodate_clamps_negative_pools() {
        let reservations = vec![reservation("Ana", 9, 12, 0)];
        let info = detailed_availability(at(9), 2.0, &reservations, &catalog(), 10, 5, None);
        assert_eq!(info.available_primary, -2);
        assert!(!info.can_accommodate(1, 0));
        assert!(info.can_accommodate(0, 5));
    }

    #[test]
    fn excluded_reservation_is_not_a_conflict() {
        let r = reservation("Ana", 10, 2, 0);
        let id = r.id.clone();
        let info = detailed_availability(at(9), 4.0, &[r], &catalog(), 10, 0, Some(&id));
        assert!(info.conflicts.is_empty());
        assert_eq!(info.available_primary, 10);
    }
}
