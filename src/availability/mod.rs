//! Availability computation over reservation snapshots.
//!
//! [`available_capacity`] answers the booking-blocking question (how many
//! primary units remain free over a candidate window) via an event-point
//! sweep. [`detailed_availability`] extends the sweep with per-conflict
//! attribution and worst-period identification for warning banners.

mod detailed;
mod engine;

pub use detailed::{detailed_availability, Conflict, DetailedAvailability, WorstPeriod};
pub use engine::available_capacity;

pub(crate) use engine::{event_points, occupied_snapshot, requested_window, OccupiedEntry};
