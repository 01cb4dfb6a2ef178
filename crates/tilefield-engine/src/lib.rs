//! Tilefield Engine -- the grid-world simulation kernel.
//!
//! A declarative description (parsed by [`tilefield_manifest`]) is compiled
//! once into a [`process::CompiledDescription`] and then driven by one or
//! more [`process::GameProcess`] instances, each owning its own [`grid::Grid`]
//! and [`observer::Observer`]. Action resolution walks the compiled
//! [`behaviour::CompiledBehaviourTable`], running primitives from
//! [`command`] against the object addressed by each command list.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use tilefield_engine::prelude::*;
//! use tilefield_manifest::Description;
//!
//! let description = Description::from_yaml(r#"
//! Version: "0.1"
//! Environment:
//!   Levels: ["HM"]
//! Objects:
//!   - {Name: harvester, MapCharacter: H}
//!   - Name: minerals
//!     MapCharacter: M
//!     Parameters: [{Name: value, InitialValue: 10}]
//! Actions:
//!   - Name: gather
//!     Behaviours:
//!       - Src: {Type: harvester, Cmd: [reward: 1]}
//!         Dst: {Type: minerals, Cmd: [decr: value]}
//! "#).unwrap();
//!
//! let compiled = Arc::new(CompiledDescription::compile(&description).unwrap());
//! let mut process = GameProcess::new(
//!     compiled,
//!     GameProcessConfig::default(),
//!     vec![1],
//!     Box::new(VectorObserver::new()),
//! );
//! process.set_level_id(0);
//! process.init(false).unwrap();
//!
//! let action = Action::new(
//!     "gather",
//!     1,
//!     Descriptor::Location((0, 0)),
//!     Descriptor::Location((1, 0)),
//!     ActionVector::Delta(1, 0),
//! );
//! let result = process.perform_actions(vec![action], true).unwrap();
//! assert_eq!(process.accumulated_rewards(1), 1);
//! assert!(!result.terminated);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod behaviour;
pub mod command;
pub mod error;
pub mod grid;
pub mod kind;
pub mod level;
pub mod object;
pub mod observer;
pub mod process;
pub mod replay;
pub mod snapshot;
pub mod termination;

/// Re-export the ECS crate for convenience.
pub use tilefield_ecs;

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use crate::action::{Action, ActionVector, Descriptor};
    pub use crate::error::EngineError;
    pub use crate::grid::Grid;
    pub use crate::kind::KindRegistry;
    pub use crate::object::{Location, Object, ObjectHandle, Orientation, PlayerId};
    pub use crate::observer::{Frame, Observer, VectorObserver};
    pub use crate::process::{
        ActionId, CompiledDescription, GameProcess, GameProcessConfig, GameProcessState,
        ObjectInfo, PerformActionsResult, StateInfo,
    };
    pub use crate::termination::TerminalState;
}
