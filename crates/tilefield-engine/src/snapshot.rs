//! Deterministic state hashing, grounded on the teacher's BLAKE3
//! content-hash pattern for snapshot/restore and replay verification.
//!
//! [`Grid`] itself is not `Serialize` (an `Arena<Object>` doesn't need to be
//! to satisfy the spec's data model); [`GridSnapshot`] is a canonical,
//! serializable projection built from the grid's public accessors, used only
//! to compute a content hash for testable property 6 ("identical batches
//! from identical state produce identical state transitions").

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::Grid;
use crate::object::{Location, Orientation, PlayerId};

#[derive(Debug, Serialize)]
struct SnapshotObject {
    kind: String,
    player_id: PlayerId,
    location: Location,
    orientation: Orientation,
    layer: u32,
    parameters: BTreeMap<String, i32>,
}

/// A canonical, serializable projection of a [`Grid`]'s contents, sorted so
/// two grids with identical contents hash identically regardless of
/// incidental arena slot reuse.
#[derive(Debug, Serialize)]
pub struct GridSnapshot {
    tick: u64,
    globals: BTreeMap<String, BTreeMap<PlayerId, i32>>,
    objects: Vec<SnapshotObject>,
}

impl Grid {
    /// Build a canonical snapshot of this grid's contents.
    pub fn snapshot(&self) -> GridSnapshot {
        let globals = self
            .global_variables()
            .iter()
            .map(|(name, by_player)| (name.clone(), by_player.iter().map(|(&p, &v)| (p, v)).collect()))
            .collect();

        let mut objects: Vec<SnapshotObject> = self
            .iter_objects()
            .map(|(_, o)| SnapshotObject {
                kind: o.kind.clone(),
                player_id: o.player_id,
                location: o.location,
                orientation: o.orientation,
                layer: o.layer,
                parameters: o.parameters.iter().map(|(k, &v)| (k.clone(), v)).collect(),
            })
            .collect();
        objects.sort_by_key(|o| (o.location, o.layer));

        GridSnapshot {
            tick: self.current_tick(),
            globals,
            objects,
        }
    }

    /// BLAKE3 hex digest of [`Grid::snapshot`]'s canonical encoding.
    pub fn state_hash(&self) -> String {
        let encoded = serde_json::to_vec(&self.snapshot()).expect("snapshot is always serializable");
        blake3::hash(&encoded).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;
    use std::collections::HashMap;

    #[test]
    fn identical_contents_hash_identically() {
        let mut a = Grid::new();
        a.init(2, 2).unwrap();
        a.add_object(Object::new(
            "harvester",
            1,
            (0, 0),
            Orientation::North,
            0,
            HashMap::new(),
        ))
        .unwrap();

        let mut b = Grid::new();
        b.init(2, 2).unwrap();
        b.add_object(Object::new(
            "harvester",
            1,
            (0, 0),
            Orientation::North,
            0,
            HashMap::new(),
        ))
        .unwrap();

        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn differing_contents_hash_differently() {
        let mut a = Grid::new();
        a.init(2, 2).unwrap();
        let mut b = Grid::new();
        b.init(2, 2).unwrap();
        b.add_object(Object::new(
            "harvester",
            1,
            (0, 0),
            Orientation::North,
            0,
            HashMap::new(),
        ))
        .unwrap();

        assert_ne!(a.state_hash(), b.state_hash());
    }
}
