//! Action (spec §4.C): an immutable intent value.
//!
//! `ActionVector::Forward` resolves against the source object's current
//! orientation at resolution time (see [`crate::behaviour::resolve_action`]);
//! `TurnLeft`/`TurnRight` rotate the source in place rather than displacing
//! it; `Delta` is an arbitrary displacement independent of orientation.

use crate::object::{Location, ObjectHandle, Orientation, PlayerId};

/// Where an action originates or targets: a live object, or a bare cell
/// (used for destinations that may be empty, and for sources issued from
/// unoccupied cells, which always fail validation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    Object(ObjectHandle),
    Location(Location),
}

/// The four action-vector conventions recognised by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVector {
    Forward,
    TurnLeft,
    TurnRight,
    Delta(i32, i32),
}

/// A pure value: kind name, issuing player, source/destination descriptors,
/// and a vector. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub player_id: PlayerId,
    pub source: Descriptor,
    pub destination: Descriptor,
    pub vector: ActionVector,
}

impl ActionVector {
    /// Grid displacement this vector produces for an actor facing
    /// `orientation`. `TurnLeft`/`TurnRight` produce no displacement --
    /// they rotate the actor in place instead, see [`ActionVector::rotation`].
    pub fn translation(self, orientation: Orientation) -> (i32, i32) {
        match self {
            ActionVector::Forward => orientation.delta(),
            ActionVector::TurnLeft | ActionVector::TurnRight => (0, 0),
            ActionVector::Delta(dx, dy) => (dx, dy),
        }
    }

    /// The orientation change this vector produces, if any.
    pub fn rotation(self, orientation: Orientation) -> Option<Orientation> {
        match self {
            ActionVector::TurnLeft => Some(orientation.turned_left()),
            ActionVector::TurnRight => Some(orientation.turned_right()),
            _ => None,
        }
    }
}

impl Action {
    pub fn new(
        name: impl Into<String>,
        player_id: PlayerId,
        source: Descriptor,
        destination: Descriptor,
        vector: ActionVector,
    ) -> Self {
        Self {
            name: name.into(),
            player_id,
            source,
            destination,
            vector,
        }
    }
}
