//! Event-point sweep for remaining capacity over a candidate window.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::catalog::Catalog;
use crate::interval::TimeInterval;
use crate::reservation::Reservation;
use crate::usage::{usage, ResourceUsage};

/// A reservation admitted to a sweep: its occupied window and resolved usage.
#[derive(Debug, Clone)]
pub(crate) struct OccupiedEntry<'a> {
    pub reservation: &'a Reservation,
    pub interval: TimeInterval,
    pub usage: ResourceUsage,
}

/// Builds the candidate window `[start, start + duration)`.
///
/// A non-positive duration yields a zero-length window, which downgrades the
/// sweep to the direct-sum fallback.
pub(crate) fn requested_window(start: DateTime<Utc>, duration_hours: f64) -> TimeInterval {
    if duration_hours <= 0.0 {
        warn!(
            duration_hours,
            "availability query with non-positive duration"
        );
        return TimeInterval::new(start, start);
    }
    TimeInterval::starting_at(
        start,
        Duration::seconds((duration_hours * 3600.0).round() as i64),
    )
}

/// Resolves every reservation that can touch the window into an
/// [`OccupiedEntry`], dropping non-occupying records and the excluded id.
///
/// Admission uses the closed-bounds overlap test so boundary reservations
/// stay in the candidate set; the end-exclusive `contains` probe decides
/// whether they hold capacity at any given instant.
pub(crate) fn occupied_snapshot<'a>(
    requested: &TimeInterval,
    reservations: &'a [Reservation],
    catalog: &Catalog,
    exclude: Option<&str>,
) -> Vec<OccupiedEntry<'a>> {
    reservations
        .iter()
        .filter(|r| exclude != Some(r.id.as_str()))
        .filter_map(|r| {
            let interval = r.occupied_interval()?;
            interval
                .overlaps_inclusive(requested)
                .then(|| OccupiedEntry {
                    reservation: r,
                    interval,
                    usage: usage(r, catalog),
                })
        })
        .collect()
}

/// Collects sorted, deduplicated event points: the window's own boundaries
/// plus every occupied-interval boundary falling strictly inside it.
pub(crate) fn event_points(
    requested: &TimeInterval,
    occupied: &[OccupiedEntry<'_>],
) -> Vec<DateTime<Utc>> {
    let mut points = vec![requested.start(), requested.end()];
    for entry in occupied {
        for boundary in [entry.interval.start(), entry.interval.end()] {
            if requested.start() < boundary && boundary < requested.end() {
                points.push(boundary);
            }
        }
    }
    points.sort_unstable();
    points.dedup();
    points
}

fn occupancy_at(occupied: &[OccupiedEntry<'_>], instant: DateTime<Utc>) -> u32 {
    occupied
        .iter()
        .filter(|entry| entry.interval.contains(instant))
        .map(|entry| entry.usage.primary_units)
        .sum()
}

/// Computes how many primary units remain free over the candidate window.
///
/// Capacity is not a flat sum over the window: distinct reservations can
/// occupy the same units at disjoint sub-windows. The sweep probes the start
/// of every sub-interval between consecutive event points and takes the
/// maximum simultaneous occupancy, which answers "can this request be
/// satisfied without double-booking at any instant".
///
/// The result may be negative when the fleet is over-allocated; callers
/// clamp to zero for display.
pub fn available_capacity(
    requested_start: DateTime<Utc>,
    requested_duration_hours: f64,
    reservations: &[Reservation],
    catalog: &Catalog,
    total_capacity: u32,
    exclude: Option<&str>,
) -> i64 {
    let requested = requested_window(requested_start, requested_duration_hours);
    let occupied = occupied_snapshot(&requested, reservations, catalog, exclude);
    let points = event_points(&requested, &occupied);

    if points.len() < 2 {
        // Degenerate window: no sub-intervals to probe, so take the direct
        // sum of everything admitted by the inclusive overlap test.
        let sum: u32 = occupied.iter().map(|e| e.usage.primary_units).sum();
        return i64::from(total_capacity) - i64::from(sum);
    }

    let mut max_occupancy = 0u32;
    for pair in points.windows(2) {
        max_occupancy = max_occupancy.max(occupancy_at(&occupied, pair[0]));
    }
    // Reservations starting exactly at the requested instant.
    max_occupancy = max_occupancy.max(occupancy_at(&occupied, requested.start()));

    i64::from(total_capacity) - i64::from(max_occupancy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceType;
    use crate::reservation::{ReservationStatus, ResourceSelection, ServiceCategory};
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

    fn booked_boards(start_hour: u32, duration_hours: f64, boards: u32) -> Reservation {
        Reservation::new(
            "client",
            ServiceCategory::Rental,
            at(start_hour),
            duration_hours,
            ResourceSelection::from_quantities([("board", boards)]),
        )
    }

    #[test]
    fn empty_snapshot_leaves_full_capacity() {
        assert_eq!(available_capacity(at(10), 2.0, &[], &catalog(), 10, None), 10);
    }

    #[test]
    fn overlapping_reservation_reduces_capacity() {
        // Occupied 09:00-14:00 (4h rented + 1h buffer).
        let reservations = vec![booked_boards(9, 4.0, 3)];
        assert_eq!(
            available_capacity(at(10), 1.0, &reservations, &catalog(), 10, None),
            7
        );
    }

    #[test]
    fn window_after_buffered_end_sees_full_capacity() {
        // Occupied interval ends (exclusive) at 14:00.
        let reservations = vec![booked_boards(9, 4.0, 3)];
        assert_eq!(
            available_capacity(at(14), 1.0, &reservations, &catalog(), 10, None),
            10
        );
    }

    #[test]
    fn disjoint_subwindows_count_peak_not_sum() {
        // Occupied 09:00-11:00 and 11:00-13:00 inside a 09:00-17:00 query.
        let reservations = vec![booked_boards(9, 1.0, 5), booked_boards(11, 1.0, 5)];
        assert_eq!(
            available_capacity(at(9), 8.0, &reservations, &catalog(), 10, None),
            5
        );
    }

    #[test]
    fn simultaneous_reservations_sum_at_peak() {
        let reservations = vec![booked_boards(9, 2.0, 4), booked_boards(10, 2.0, 4)];
        assert_eq!(
            available_capacity(at(9), 4.0, &reservations, &catalog(), 10, None),
            2
        );
    }

    #[test]
    fn excluded_reservation_is_ignored() {
        let r = booked_boards(9, 4.0, 3);
        let id = r.id.clone();
        let reservations = vec![r];
        assert_eq!(
            available_capacity(at(10), 1.0, &reservations, &catalog(), 10, Some(&id)),
            10
        );
    }

    #[test]
    fn terminal_reservations_do_not_block() {
        let mut r = booked_boards(9, 4.0, 3);
        r.status = ReservationStatus::Cancelled;
        assert_eq!(
            available_capacity(at(10), 1.0, &[r], &catalog(), 10, None),
            10
        );
    }

    #[test]
    fn over_allocation_goes_negative() {
        let reservations = vec![booked_boards(9, 2.0, 8), booked_boards(9, 2.0, 8)];
        assert_eq!(
            available_capacity(at(9), 1.0, &reservations, &catalog(), 10, None),
            -6
        );
    }

    #[test]
    fn accessories_never_gate_primary_capacity() {
        let r = Reservation::new(
            "client",
            ServiceCategory::Rental,
            at(9),
            2.0,
            ResourceSelection::from_quantities([("paddle", 6)]),
        );
        assert_eq!(
            available_capacity(at(9), 2.0, &[r], &catalog(), 10, None),
            10
        );
    }

    #[test]
    fn zero_duration_query_falls_back_to_direct_sum() {
        let reservations = vec![booked_boards(9, 2.0, 3)];
        // Window [10:00, 10:00) has a single event point; the fallback sums
        // the inclusive-overlap candidates directly.
        assert_eq!(
            available_capacity(at(10), 0.0, &reservations, &catalog(), 10, None),
            7
        );
    }

    #[test]
    fn adding_overlap_never_increases_capacity() {
        let mut reservations = vec![booked_boards(9, 2.0, 2)];
        let before = available_capacity(at(9), 3.0, &reservations, &catalog(), 10, None);
        reservations.push(booked_boards(10, 2.0, 1));
        let after = available_capacity(at(9), 3.0, &reservations, &catalog(), 10, None);
        assert!(after <= before);
    }

    #[test]
    fn event_points_are_sorted_and_inside_window() {
        let requested = TimeInterval::new(at(9), at(17));
        let reservations = vec![booked_boards(10, 1.0, 1), booked_boards(12, 1.0, 1)];
        let occupied = occupied_snapshot(&requested, &reservations, &catalog(), None);
        let points = event_points(&requested, &occupied);
        // 09, 10, 12 (boundary 12 deduplicated), 14, 17.
        assert_eq!(points, vec![at(9), at(10), at(12), at(14), at(17)]);
    }
}
