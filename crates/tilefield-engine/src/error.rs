//! Engine-level error taxonomy (spec §7).
//!
//! Load-time and lifecycle errors (`UnknownKind`, `InvalidLevel`,
//! `NotInitialized`, ...) propagate to the caller immediately. Command-level
//! failures (`InvalidAction`, `Blocked`) are contained within the action that
//! produced them and never reach this type -- see [`crate::command::CommandFailure`].

/// Errors produced by the simulation kernel.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum EngineError {
    /// An object kind name was referenced that was never registered.
    #[error("unknown object kind '{0}'")]
    UnknownKind(String),

    /// Two kinds were registered under the same name.
    #[error("duplicate object kind '{0}'")]
    DuplicateKind(String),

    /// Two kinds were registered under the same map character.
    #[error("duplicate map character '{0}'")]
    DuplicateMapChar(char),

    /// A level's text referenced a map character with no registered kind, or
    /// its rows exceed the declared/derived extents.
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// `Grid::init` was called on an already-initialized grid.
    #[error("grid already initialized")]
    AlreadyInitialized,

    /// An operation that requires `init()`/`reset()` to have run was called
    /// before it had.
    #[error("game process has not been initialized")]
    NotInitialized,

    /// `move_object`/`add_object` targeted a cell outside `[0, width) x [0, height)`.
    #[error("location ({0}, {1}) is out of bounds")]
    OutOfBounds(i32, i32),

    /// `add_object`/`move_object` targeted a cell already occupied at the
    /// relevant layer.
    #[error("cell ({0}, {1}) is occupied at layer {2}")]
    CellOccupied(i32, i32, u32),

    /// A cascaded action exceeded the configured maximum depth; the tick
    /// that produced it has been rolled back.
    #[error("cascade depth exceeded the configured maximum of {0}")]
    CascadeOverflow(usize),

    /// `perform_actions` was called on a process requiring `reset()` and not
    /// configured to auto-reset.
    #[error("episode has terminated and requires reset()")]
    RequiresReset,

    /// An action's source was missing or not owned by the issuing player.
    /// Contained: surfaced as a no-op with zero reward, never propagated out
    /// of `perform_actions`.
    #[error("invalid action '{0}': source missing or not owned by the issuing player")]
    InvalidAction(String),
}
