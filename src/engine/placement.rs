// ==========================================
// Asset Inventory - rack placement engine
// ==========================================
// Responsibility: decide whether an asset of a given U height fits at
// a given 1-based rack unit inside its parent container, against the
// occupancy of the already-persisted siblings.
//
// Rows of one import are processed sequentially, so placements within
// one call see each other's commits. Placements from concurrent calls
// are serialized by the API-level import lock, not here.
// ==========================================

use crate::repository::{AssetRepository, RepositoryError};
use thiserror::Error;

/// Placement check failures. The display strings are the exact texts
/// surfaced to API callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("Position is wrong")]
    WrongPosition,

    #[error("Size is wrong")]
    WrongSize,

    #[error("Asset is out bounds")]
    OutOfBounds,

    #[error("Asset place is occupied")]
    Occupied,

    #[error("placement lookup failed: {0}")]
    Lookup(String),
}

impl From<RepositoryError> for PlacementError {
    fn from(err: RepositoryError) -> Self {
        PlacementError::Lookup(err.to_string())
    }
}

/// Check whether `asset_id` (0 for a new asset) can occupy rack units
/// `[location_start, location_start + size)` inside `parent_id`.
///
/// A parent without a recorded `u_size` ext attribute is not a
/// constrained container; the check passes.
pub fn try_place_asset(
    repo: &AssetRepository,
    asset_id: u32,
    parent_id: u32,
    size: u32,
    location_start: u32,
) -> Result<(), PlacementError> {
    if location_start == 0 {
        return Err(PlacementError::WrongPosition);
    }
    if size == 0 {
        return Err(PlacementError::WrongSize);
    }

    let parent_u_size = match repo.select_ext_attribute(parent_id, "u_size")? {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) => n,
            // unparsable container size: treat as unconstrained
            Err(_) => return Ok(()),
        },
        None => return Ok(()),
    };

    let mut occupied = vec![false; parent_u_size];
    for sibling in repo.select_assets_by_parent(parent_id)? {
        if sibling == asset_id {
            continue;
        }
        let Some(sib_size) = repo.select_ext_attribute(sibling, "u_size")? else {
            continue;
        };
        let Some(sib_pos) = repo.select_ext_attribute(sibling, "location_u_pos")? else {
            continue;
        };
        let (Ok(sib_size), Ok(sib_pos)) = (sib_size.parse::<usize>(), sib_pos.parse::<usize>())
        else {
            continue;
        };
        if sib_pos == 0 {
            continue;
        }
        // out-of-range sibling marks are silently clipped
        for unit in (sib_pos - 1)..(sib_pos - 1 + sib_size) {
            if unit < parent_u_size {
                occupied[unit] = true;
            }
        }
    }

    let start = (location_start - 1) as usize;
    for unit in start..(start + size as usize) {
        if unit >= parent_u_size {
            return Err(PlacementError::OutOfBounds);
        }
        if occupied[unit] {
            return Err(PlacementError::Occupied);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, open_in_memory_connection};
    use crate::domain::asset::ExtValue;
    use crate::domain::types::{AssetOperation, AssetStatus};
    use crate::domain::AssetRow;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    fn setup_repo() -> AssetRepository {
        let conn = open_in_memory_connection().unwrap();
        init_schema(&conn).unwrap();
        AssetRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn insert(repo: &AssetRepository, name: &str, parent: u32, ext: &[(&str, &str)]) -> u32 {
        let mut ext_map = BTreeMap::new();
        for (k, v) in ext {
            ext_map.insert(k.to_string(), ExtValue::rw(*v));
        }
        let row = AssetRow {
            row: 1,
            id: 0,
            operation: AssetOperation::Insert,
            name: name.to_string(),
            ext_name: name.to_string(),
            type_name: "rack".to_string(),
            type_id: 5,
            subtype_name: "N_A".to_string(),
            subtype_id: 15,
            status: AssetStatus::Active,
            priority: 3,
            asset_tag: None,
            parent_id: parent,
            group_ids: BTreeSet::new(),
            power_links: Vec::new(),
            ext: ext_map,
            is_rc0_self: false,
            is_rack_controller: false,
        };
        repo.insert_asset(&row, AssetStatus::Active, None).unwrap()
    }

    #[test]
    fn test_zero_position_and_size_fail_first() {
        let repo = setup_repo();
        assert_eq!(
            try_place_asset(&repo, 0, 99, 1, 0),
            Err(PlacementError::WrongPosition)
        );
        assert_eq!(
            try_place_asset(&repo, 0, 99, 0, 1),
            Err(PlacementError::WrongSize)
        );
    }

    #[test]
    fn test_unconstrained_parent_always_fits() {
        let repo = setup_repo();
        let rack = insert(&repo, "rack-nosize", 0, &[]);
        assert_eq!(try_place_asset(&repo, 0, rack, 100, 100), Ok(()));
    }

    #[test]
    fn test_bounds() {
        let repo = setup_repo();
        let rack = insert(&repo, "rack-10u", 0, &[("u_size", "10")]);

        // start = N - size + 1 fits exactly
        assert_eq!(try_place_asset(&repo, 0, rack, 4, 7), Ok(()));
        // one unit further is out of bounds
        assert_eq!(
            try_place_asset(&repo, 0, rack, 4, 8),
            Err(PlacementError::OutOfBounds)
        );
    }

    #[test]
    fn test_occupancy_conflict() {
        let repo = setup_repo();
        let rack = insert(&repo, "rack-42u", 0, &[("u_size", "42")]);
        let srv = insert(
            &repo,
            "srv-a",
            rack,
            &[("u_size", "4"), ("location_u_pos", "10")],
        );

        // overlapping with srv-a [10, 14)
        assert_eq!(
            try_place_asset(&repo, 0, rack, 2, 13),
            Err(PlacementError::Occupied)
        );
        // disjoint below and above
        assert_eq!(try_place_asset(&repo, 0, rack, 9, 1), Ok(()));
        assert_eq!(try_place_asset(&repo, 0, rack, 2, 14), Ok(()));
        // the occupying asset itself is excluded from the check
        assert_eq!(try_place_asset(&repo, srv, rack, 4, 10), Ok(()));
    }

    #[test]
    fn test_out_of_range_sibling_marks_are_clipped() {
        let repo = setup_repo();
        let rack = insert(&repo, "rack-8u", 0, &[("u_size", "8")]);
        insert(
            &repo,
            "srv-tall",
            rack,
            &[("u_size", "20"), ("location_u_pos", "5")],
        );

        // units 5..8 are occupied, the rest of the 20U claim is dropped
        assert_eq!(try_place_asset(&repo, 0, rack, 4, 1), Ok(()));
        assert_eq!(
            try_place_asset(&repo, 0, rack, 1, 6),
            Err(PlacementError::Occupied)
        );
    }
}
