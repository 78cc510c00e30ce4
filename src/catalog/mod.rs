//! Resource-type catalog snapshots.
//!
//! The engine never fetches or caches the catalog itself: callers pass an
//! immutable [`Catalog`] snapshot into each computation, so every call is a
//! pure function of its arguments and concurrent queries cannot observe two
//! catalog versions mid-computation.

use std::collections::HashMap;

use crate::Id;

#[cfg(feature = "remote-catalog")]
pub mod remote;

/// A rentable resource class.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceType {
    pub id: Id,
    /// Whether instances of this type consume shared time-slot capacity.
    /// Accessories (paddles, vests, dry bags) are tracked but never gate
    /// scheduling.
    pub affects_availability: bool,
    /// Capacity units one instance consumes. A board is 1; a raft takes the
    /// rack space of 2.
    pub board_equivalent: u32,
}

impl ResourceType {
    /// A capacity-gating type worth `board_equivalent` units per instance.
    pub fn gating(id: impl Into<Id>, board_equivalent: u32) -> Self {
        Self {
            id: id.into(),
            affects_availability: true,
            board_equivalent,
        }
    }

    /// A tracked, non-gating accessory type.
    pub fn accessory(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            affects_availability: false,
            board_equivalent: 0,
        }
    }
}

/// Immutable snapshot of the resource-type catalog, keyed by type id.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog(HashMap<Id, ResourceType>);

impl Catalog {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, id: &str) -> Option<&ResourceType> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the resource types in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceType> + '_ {
        self.0.values()
    }
}

impl FromIterator<ResourceType> for Catalog {
    fn from_iter<I: IntoIterator<Item = ResourceType>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|rt| (rt.id.clone(), rt))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_iter([
            ResourceType::gating("board", 1),
            ResourceType::gating("raft", 2),
            ResourceType::accessory("paddle"),
        ])
    }

    #[test]
    fn from_iterator_keys_by_id() {
        let catalog = sample();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("board"));
        assert_eq!(catalog.get("raft").unwrap().board_equivalent, 2);
        assert!(catalog.get("trailer").is_none());
    }

    #[test]
    fn constructors_set_gating_flag() {
        assert!(ResourceType::gating("board", 1).affects_availability);
        assert!(!ResourceType::accessory("paddle").affects_availability);
    }

    #[test]
    fn later_duplicate_id_wins() {
        let catalog = Catalog::from_iter([
            ResourceType::gating("board", 1),
            ResourceType::gating("board", 3),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("board").unwrap().board_equivalent, 3);
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.iter().count(), 0);
    }
}
