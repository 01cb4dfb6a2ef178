//! The [`Object`] record and the four-way [`Orientation`] it carries.
//!
//! An object's kind never changes over its lifetime (`change_to` replaces the
//! object wholesale rather than mutating its kind in place, per the data
//! model's "cannot change kind" rule). Location mutation is exposed only
//! through [`crate::grid::Grid::move_object`] so dirty-cell tracking stays
//! consistent -- this type intentionally has no public setter for `location`.

use std::collections::HashMap;

use tilefield_ecs::handle::Handle;

/// A player identifier. `0` is reserved for the environment/engine itself,
/// matching the global-variable convention in the data model.
pub type PlayerId = u32;

/// A grid cell coordinate.
pub type Location = (i32, i32);

/// Stable address of a live [`Object`] inside a [`crate::grid::Grid`].
pub type ObjectHandle = Handle<Object>;

/// One of the four cardinal directions an object may face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// Unit displacement this orientation faces (`+y` is south, matching the
    /// row-major level text format where row index increases downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Orientation::North => (0, -1),
            Orientation::East => (1, 0),
            Orientation::South => (0, 1),
            Orientation::West => (-1, 0),
        }
    }

    pub fn turned_left(self) -> Orientation {
        match self {
            Orientation::North => Orientation::West,
            Orientation::West => Orientation::South,
            Orientation::South => Orientation::East,
            Orientation::East => Orientation::North,
        }
    }

    pub fn turned_right(self) -> Orientation {
        match self {
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
        }
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Orientation::North
    }
}

/// A live entity in the grid.
///
/// `layer` is denormalized from the owning kind's registration (see
/// [`crate::kind::KindRegistry`]) so the grid never has to consult the kind
/// registry to place or move an object.
#[derive(Debug, Clone)]
pub struct Object {
    pub kind: String,
    pub player_id: PlayerId,
    pub location: Location,
    pub orientation: Orientation,
    pub layer: u32,
    pub parameters: HashMap<String, i32>,
}

impl Object {
    pub fn new(
        kind: impl Into<String>,
        player_id: PlayerId,
        location: Location,
        orientation: Orientation,
        layer: u32,
        parameters: HashMap<String, i32>,
    ) -> Self {
        Self {
            kind: kind.into(),
            player_id,
            location,
            orientation,
            layer,
            parameters,
        }
    }

    pub fn parameter(&self, name: &str) -> i32 {
        self.parameters.get(name).copied().unwrap_or(0)
    }
}
