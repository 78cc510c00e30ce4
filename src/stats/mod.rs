//! Hourly utilization and revenue statistics for a calendar day.
//!
//! The aggregator buckets reservations into the operating day's hourly slots
//! and derives the date-level figures the calendar view renders. The whole
//! pipeline is stateless: every call re-runs over the supplied snapshot, and
//! one bad record can only remove itself, never blank the day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::catalog::Catalog;
use crate::interval::TimeInterval;
use crate::reservation::{Reservation, ResourceSelection, ServiceCategory};
use crate::usage::usage;
use crate::Id;

/// First hour of the operating day.
pub const DAY_FIRST_HOUR: u32 = 9;
/// Last slot of the operating day, `[23:00, 24:00)`.
pub const DAY_LAST_HOUR: u32 = 23;
/// Slot load ratio above which an hour counts as a peak hour.
pub const PEAK_THRESHOLD: f64 = 0.7;
/// Heuristic rate per primary unit-hour when no pricing collaborator is
/// available or it fails.
pub const FALLBACK_UNIT_RATE: f64 = 15.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("pricing backend unavailable: {0}")]
    Backend(String),
}

/// Price calculation collaborator. Pricing configuration lives inside the
/// implementor; the engine only sees per-reservation subtotals.
pub trait PricingModel: Send + Sync {
    fn subtotal(
        &self,
        category: ServiceCategory,
        selection: &ResourceSelection,
        duration_hours: f64,
    ) -> Result<f64, PricingError>;
}

/// One-hour bucket of the operating day.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSlot {
    /// Hour of day, `DAY_FIRST_HOUR..=DAY_LAST_HOUR`.
    pub hour: u32,
    /// Remaining primary units, clamped to zero.
    pub available: u32,
    /// Primary units held by reservations overlapping this hour.
    pub booked: u32,
    /// Ids of the reservations contributing to `booked`.
    pub reservations: Vec<Id>,
}

/// Date-level aggregate driving the calendar view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayStatistics {
    pub date: NaiveDate,
    pub total_capacity: u32,
    /// Reservations whose effective start falls on this date.
    pub booked_slots: u32,
    /// Rounded mean of the hourly load ratios. An average, not a maximum:
    /// one saturated hour must not read as a fully booked day.
    pub utilization_percent: u32,
    /// Hours whose load ratio exceeds [`PEAK_THRESHOLD`].
    pub peak_hours: Vec<u32>,
    /// Service categories among the day-starting reservations, sorted.
    pub categories: Vec<ServiceCategory>,
    pub slots: Vec<TimeSlot>,
    pub recommendations: Vec<String>,
    /// Summed subtotals of the day-starting reservations.
    pub revenue: f64,
}

fn day_base(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight exists for every date")
        .and_utc()
}

/// The operating-day window `[09:00, 24:00)`.
fn day_window(date: NaiveDate) -> TimeInterval {
    let base = day_base(date);
    TimeInterval::new(
        base + Duration::hours(i64::from(DAY_FIRST_HOUR)),
        base + Duration::hours(24),
    )
}

fn heuristic_subtotal(reservation: &Reservation, catalog: &Catalog) -> f64 {
    let units = usage(reservation, catalog).primary_units;
    f64::from(units) * FALLBACK_UNIT_RATE * reservation.duration_hours
}

fn reservation_subtotal(
    reservation: &Reservation,
    catalog: &Catalog,
    pricing: Option<&dyn PricingModel>,
) -> f64 {
    match pricing {
        Some(model) => match model.subtotal(
            reservation.category,
            &reservation.selection,
            reservation.duration_hours,
        ) {
            Ok(subtotal) => subtotal,
            Err(err) => {
                warn!(
                    reservation = %reservation.id,
                    error = %err,
                    "pricing collaborator failed; using heuristic subtotal"
                );
                heuristic_subtotal(reservation, catalog)
            }
        },
        None => heuristic_subtotal(reservation, catalog),
    }
}

fn recommendations(
    utilization_percent: u32,
    booked_slots: u32,
    peak_hours: &[u32],
) -> Vec<String> {
    let mut notes = Vec::new();
    if booked_slots == 0 {
        notes.push("No reservations start this day.".to_string());
        return notes;
    }
    if utilization_percent >= 80 {
        notes.push("High demand: consider adding capacity or staff.".to_string());
    } else if utilization_percent < 30 {
        notes.push("Low utilization: capacity available for walk-ins.".to_string());
    }
    if let (Some(first), Some(last)) = (peak_hours.first(), peak_hours.last()) {
        notes.push(format!(
            "Peak load between {first:02}:00 and {:02}:00; stagger start times where possible.",
            last + 1
        ));
    }
    notes
}

/// Computes the full statistics report for one calendar day.
///
/// A reservation is *relevant* when its buffered occupied interval touches
/// the operating-day window (including spillover from the previous evening),
/// and relevant reservations fill the hourly slots. Only reservations whose
/// effective start falls on `date` count toward the headline booking count,
/// the category list, and revenue.
pub fn day_statistics(
    date: NaiveDate,
    reservations: &[Reservation],
    catalog: &Catalog,
    total_capacity: u32,
    pricing: Option<&dyn PricingModel>,
) -> DayStatistics {
    let window = day_window(date);
    let base = day_base(date);

    let relevant: Vec<(&Reservation, TimeInterval, u32)> = reservations
        .iter()
        .filter_map(|r| r.occupied_interval().map(|occupied| (r, occupied)))
        .filter(|(_, occupied)| occupied.overlaps(&window))
        .map(|(r, occupied)| (r, occupied, usage(r, catalog).primary_units))
        .collect();

    let day_starting: Vec<&Reservation> = relevant
        .iter()
        .filter(|(r, _, _)| r.effective_start().date_naive() == date)
        .map(|(r, _, _)| *r)
        .collect();

    let mut slots = Vec::with_capacity((DAY_LAST_HOUR - DAY_FIRST_HOUR + 1) as usize);
    let mut ratio_sum = 0.0;
    let mut peak_hours = Vec::new();
    for hour in DAY_FIRST_HOUR..=DAY_LAST_HOUR {
        let slot_window = TimeInterval::new(
            base + Duration::hours(i64::from(hour)),
            base + Duration::hours(i64::from(hour) + 1),
        );
        let mut booked = 0u32;
        let mut contributing = Vec::new();
        for (r, occupied, primary_units) in &relevant {
            if occupied.overlaps(&slot_window) {
                booked += primary_units;
                contributing.push(r.id.clone());
            }
        }
        let available = u32::try_from(i64::from(total_capacity) - i64::from(booked))
            .unwrap_or(0);
        if total_capacity > 0 {
            let ratio = f64::from(booked) / f64::from(total_capacity);
            ratio_sum += ratio;
            if ratio > PEAK_THRESHOLD {
                peak_hours.push(hour);
            }
        }
        slots.push(TimeSlot {
            hour,
            available,
            booked,
            reservations: contributing,
        });
    }

    let utilization_percent = if total_capacity > 0 && !slots.is_empty() {
        (ratio_sum / slots.len() as f64 * 100.0).round() as u32
    } else {
        0
    };

    let mut categories: Vec<ServiceCategory> =
        day_starting.iter().map(|r| r.category).collect();
    categories.sort_unstable();
    categories.dedup();

    let revenue = day_starting
        .iter()
        .map(|r| reservation_subtotal(r, catalog, pricing))
        .sum();

    let booked_slots = day_starting.len() as u32;
    let recommendations = recommendations(utilization_percent, booked_slots, &peak_hours);

    DayStatistics {
        date,
        total_capacity,
        booked_slots,
        utilization_percent,
        peak_hours,
        categories,
        slots,
        recommendations,
        revenue,
    }
}

/// Computes statistics for several days in parallel.
///
/// Each day is an independent pass over the same immutable snapshot, so the
/// batch parallelizes cleanly. The calendar view recomputes its ~30 visible
/// days this way.
pub fn day_statistics_range(
    dates: &[NaiveDate],
    reservations: &[Reservation],
    catalog: &Catalog,
    total_capacity: u32,
    pricing: Option<&dyn PricingModel>,
) -> Vec<DayStatistics> {
    dates
        .par_iter()
        .map(|&date| day_statistics(date, reservations, catalog, total_capacity, pricing))
        .collect()
}
