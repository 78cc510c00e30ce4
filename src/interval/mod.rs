//! Half-open time interval over calendar instants.

use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};

/// Half-open range `[start, end)` on the UTC timeline.
///
/// The end instant is excluded: a reservation whose occupancy ends at 14:00
/// does not hold capacity at 14:00. Boundary queries that need closed-bounds
/// semantics go through [`TimeInterval::overlaps_inclusive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Creates interval `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "TimeInterval start must be <= end");
        Self { start, end }
    }

    /// Creates the interval `[start, start + duration)`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, start + duration)
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns true if `instant` ∈ `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Checks if this interval overlaps another under half-open semantics.
    ///
    /// Abutting intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Closed-bounds overlap test: abutting intervals count as overlapping.
    ///
    /// The availability sweep uses this to keep boundary reservations in the
    /// candidate set; the end-exclusive [`contains`](Self::contains) probe
    /// decides whether they actually hold capacity at an instant.
    pub fn overlaps_inclusive(&self, other: &TimeInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        if self.overlaps(other) {
            let start = self.start.max(other.start);
            let end = self.end.min(other.end);
            Some(TimeInterval::new(start, end))
        } else {
            None
        }
    }
}

impl Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

// =============================================================================
// TimeInterval Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("TimeInterval", 2)?;
        s.serialize_field("start", &self.start)?;
        s.serialize_field("end", &self.end)?;
        s.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.start > raw.end {
            return Err(serde::de::Error::custom("interval start must be <= end"));
        }
        Ok(Self::new(raw.start, raw.end))
    }
}
