//! Maps a reservation's resource selection to consumed units per class.

use tracing::debug;

use crate::catalog::Catalog;
use crate::reservation::{Reservation, ResourceSelection};

#[cfg(feature = "remote-catalog")]
use crate::catalog::remote::{CatalogError, CatalogProvider, MemoizedCatalog};

/// Capacity units a legacy raft count consumes per raft.
pub const RAFT_BOARD_EQUIVALENT: u32 = 2;

/// Units a reservation consumes, split by counting rule.
///
/// Primary units gate shared time-slot capacity; accessory units are tracked
/// against their own pool but never block scheduling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceUsage {
    pub primary_units: u32,
    pub accessory_units: u32,
}

impl ResourceUsage {
    pub const fn new(primary_units: u32, accessory_units: u32) -> Self {
        Self {
            primary_units,
            accessory_units,
        }
    }
}

impl std::fmt::Display for ResourceUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} primary / {} accessory",
            self.primary_units, self.accessory_units
        )
    }
}

/// Computes the units a reservation consumes against a catalog snapshot.
///
/// Modern selections resolve each type through the catalog: gating types
/// contribute `quantity × board_equivalent` primary units, accessories
/// contribute their quantity to the accessory pool. A type id the catalog
/// does not know counts as primary so a stale catalog can only under-report
/// availability, never overbook the fleet.
///
/// Legacy selections use the fixed discrete counting rule: every board
/// variant is one unit and a raft is [`RAFT_BOARD_EQUIVALENT`].
pub fn usage(reservation: &Reservation, catalog: &Catalog) -> ResourceUsage {
    match &reservation.selection {
        ResourceSelection::Modern(quantities) => {
            let mut result = ResourceUsage::default();
            for (type_id, &qty) in quantities {
                match catalog.get(type_id) {
                    Some(resource_type) if resource_type.affects_availability => {
                        result.primary_units += qty * resource_type.board_equivalent;
                    }
                    Some(_) => result.accessory_units += qty,
                    None => {
                        debug!(
                            reservation = %reservation.id,
                            resource_type = %type_id,
                            "unknown resource type; counting as primary"
                        );
                        result.primary_units += qty;
                    }
                }
            }
            result
        }
        ResourceSelection::Legacy {
            boards,
            boards_with_seat,
            rafts,
        } => ResourceUsage::new(boards + boards_with_seat + rafts * RAFT_BOARD_EQUIVALENT, 0),
    }
}

/// Async variant of [`usage`] against a memoized remote catalog.
///
/// Identical counting rules; may suspend on the first call while the
/// snapshot is fetched.
#[cfg(feature = "remote-catalog")]
pub async fn usage_via<P: CatalogProvider>(
    reservation: &Reservation,
    catalog: &MemoizedCatalog<P>,
) -> Result<ResourceUsage, CatalogError> {
    let snapshot = catalog.snapshot().await?;
    Ok(usage(reservation, snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ResourceType;
    use crate::reservation::ServiceCategory;
    use chrono::{TimeZone, Utc};

    fn catalog() -> Catalog {
        Catalog::from_iter([
            ResourceType::gating("board", 1),
            ResourceType::gating("raft", 2),
            ResourceType::accessory("paddle"),
        ])
    }

    fn with_selection(selection: ResourceSelection) -> Reservation {
        Reservation::new(
            "Bob",
            ServiceCategory::Rental,
            Utc.with_ymd_and_hms(2025, 6, 14, 9, 0, 0).unwrap(),
            2.0,
            selection,
        )
    }

    #[test]
    fn modern_selection_splits_pools() {
        let r = with_selection(ResourceSelection::from_quantities([
            ("board", 3),
            ("raft", 1),
            ("paddle", 4),
        ]));
        let u = usage(&r, &catalog());
        // 3 boards + 1 raft at weight 2
        assert_eq!(u, ResourceUsage::new(5, 4));
    }

    #[test]
    fn unknown_type_counts_as_primary() {
        let r = with_selection(ResourceSelection::from_quantities([("trailer", 2)]));
        let u = usage(&r, &catalog());
        assert_eq!(u, ResourceUsage::new(2, 0));
    }

    #[test]
    fn legacy_counts_use_fixed_rule() {
        let r = with_selection(ResourceSelection::from_legacy_counts(2, 1, 2));
        let u = usage(&r, &catalog());
        // 2 boards + 1 seated board + 2 rafts at weight 2
        assert_eq!(u, ResourceUsage::new(7, 0));
    }

    #[test]
    fn legacy_counts_ignore_catalog() {
        let r = with_selection(ResourceSelection::from_legacy_counts(1, 0, 0));
        assert_eq!(usage(&r, &Catalog::new()), ResourceUsage::new(1, 0));
    }

    #[test]
    fn empty_modern_selection_consumes_nothing() {
        let r = with_selection(ResourceSelection::from_quantities(
            std::iter::empty::<(&str, u32)>(),
        ));
        assert_eq!(usage(&r, &catalog()), ResourceUsage::default());
    }

    #[cfg(feature = "remote-catalog")]
    mod remote {
        use super::*;
        use crate::catalog::remote::{CatalogError, CatalogProvider, MemoizedCatalog};
        use async_trait::async_trait;

        struct FixedProvider;

        #[async_trait]
        impl CatalogProvider for FixedProvider {
            async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
                Ok(catalog())
            }
        }

        #[tokio::test]
        async fn async_variant_matches_sync_once_warm() {
            let memo = MemoizedCatalog::new(FixedProvider);
            let r = with_selection(ResourceSelection::from_quantities([
                ("board", 2),
                ("paddle", 1),
            ]));
            let via_remote = usage_via(&r, &memo).await.unwrap();
            assert_eq!(via_remote, usage(&r, &catalog()));
        }
    }
}
