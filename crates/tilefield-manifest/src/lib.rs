//! Tilefield Manifest -- parses the YAML-shaped declarative description
//! (spec §6: `Version`/`Environment`/`Objects`/`Actions`/`Terminations`) into
//! a validated [`Description`], the input the simulation kernel compiles
//! into a [`tilefield_engine`](../tilefield_engine/index.html)-ready
//! behaviour table.
//!
//! Loading happens once per process; the result is then treated as read-only
//! and shared across every [`tilefield_engine::process::GameProcess`]
//! instance running the same description (see the concurrency model in
//! spec §5).

#![deny(unsafe_code)]

pub mod command;
pub mod description;
mod error;

pub use command::CommandInvocation;
pub use description::{
    ActionDefinition, BehaviourDefinition, BlockDefinition, ComparisonOp, Description,
    EnvironmentDefinition, ObjectDefinition, ParameterDefinition, RoleDefinition,
    TerminationCondition, TerminationDefinition, TerminationOperand, TerminationPlayers,
    TerminationResolution,
};
pub use error::ManifestError;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::{
        ActionDefinition, BehaviourDefinition, BlockDefinition, CommandInvocation, ComparisonOp,
        Description, EnvironmentDefinition, ManifestError, ObjectDefinition, ParameterDefinition,
        RoleDefinition, TerminationCondition, TerminationDefinition, TerminationOperand,
        TerminationPlayers, TerminationResolution,
    };
}
