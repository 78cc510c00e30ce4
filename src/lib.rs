//! floatplan - availability engine for paddle-sport rental fleets
//!
//! Computes remaining capacity, conflict reports, and per-day utilization
//! statistics from immutable reservation snapshots. Pure in-process library:
//! the booking layer owns the data, this crate only derives from it.

pub mod availability;
pub mod catalog;
pub mod interval;
pub mod reservation;
pub mod stats;
pub mod usage;
pub mod warnings;

pub use availability::{
    available_capacity, detailed_availability, Conflict, DetailedAvailability, WorstPeriod,
};
pub use catalog::{Catalog, ResourceType};
pub use interval::TimeInterval;
pub use reservation::{
    Reservation, ReservationStatus, ResourceSelection, ServiceCategory, SERVICE_BUFFER,
};
pub use stats::{
    day_statistics, day_statistics_range, DayStatistics, PricingError, PricingModel, TimeSlot,
};
pub use usage::{usage, ResourceUsage};
#[cfg(feature = "remote-catalog")]
pub use usage::usage_via;
pub use warnings::availability_warnings;

/// Identifier type used for reservations and resource types.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
