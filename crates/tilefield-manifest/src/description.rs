//! The declarative description's data model: objects, actions, behaviours,
//! terminations, and the environment block. Field names mirror the YAML keys
//! in spec §6 exactly (`Name`, `MapCharacter`, `Src`/`Dst`, ...) so the
//! `serde` derive needs no renaming for the unambiguous fields; only the
//! polymorphic `Cmd`/`Type` shapes get custom handling (see [`crate::command`]).

use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::command::{single_or_list, CommandInvocation};
use crate::error::ManifestError;

/// Pixel dimensions and color hint consumed by concrete (pixel-producing)
/// observers. The engine carries this through unmodified; it has no bearing
/// on simulation semantics.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDefinition {
    /// RGB color in `[0.0, 1.0]`.
    pub color: [f32; 3],
    /// Rendering hint: `"square"`, `"triangle"`, etc. Observer-defined.
    pub shape: String,
    /// Uniform scale factor, defaults to `1.0`.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// One `{Name, InitialValue}` entry under an object's `Parameters` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDefinition {
    /// Parameter name, scoped to the owning object kind.
    #[serde(rename = "Name")]
    pub name: String,
    /// Seed value every new instance of this kind starts with.
    #[serde(rename = "InitialValue", default)]
    pub initial_value: i32,
}

/// One entry under the top-level `Objects` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDefinition {
    /// Kind name, referenced by `Src`/`Dst` `Type` and by `change_to`.
    #[serde(rename = "Name")]
    pub name: String,
    /// Single character used by the level text format to place this kind.
    #[serde(rename = "MapCharacter")]
    pub map_character: char,
    /// Sprite asset path, consumed by concrete observers only.
    #[serde(rename = "Sprite", default)]
    pub sprite: Option<String>,
    /// Block-shape rendering hint, consumed by concrete observers only.
    #[serde(rename = "Block", default)]
    pub block: Option<BlockDefinition>,
    /// Parameter schema with initial values, seeded into every new instance.
    #[serde(rename = "Parameters", default)]
    pub parameters: Vec<ParameterDefinition>,
}

/// The `Src` or `Dst` half of one behaviour entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleDefinition {
    /// The object kind(s) playing this role. A bare scalar or a sequence.
    #[serde(rename = "Type", deserialize_with = "single_or_list")]
    pub types: Vec<String>,
    /// The ordered command list run when this role's kind participates.
    #[serde(rename = "Cmd", default)]
    pub commands: Vec<CommandInvocation>,
}

/// One `Src`/`Dst` pair under an action's `Behaviours` list.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviourDefinition {
    #[serde(rename = "Src")]
    pub src: RoleDefinition,
    #[serde(rename = "Dst")]
    pub dst: RoleDefinition,
}

/// One entry under the top-level `Actions` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Behaviours")]
    pub behaviours: Vec<BehaviourDefinition>,
}

/// A termination predicate's left- or right-hand operand.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub enum TerminationOperand {
    /// A global variable, scoped by player id (`0` for engine-wide).
    GlobalVariable {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Player", default)]
        player: u32,
    },
    /// A player's currently accumulated reward.
    Reward {
        #[serde(rename = "Player")]
        player: u32,
    },
    /// The number of live objects of a given kind.
    ObjectCount {
        #[serde(rename = "Kind")]
        kind: String,
    },
    /// A literal constant.
    Const(i64),
}

/// Comparison used by a [`TerminationCondition`].
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub fn evaluate(self, lhs: i64, rhs: i64) -> bool {
        match self {
            ComparisonOp::Eq => lhs == rhs,
            ComparisonOp::Ne => lhs != rhs,
            ComparisonOp::Lt => lhs < rhs,
            ComparisonOp::Le => lhs <= rhs,
            ComparisonOp::Gt => lhs > rhs,
            ComparisonOp::Ge => lhs >= rhs,
        }
    }
}

/// A single comparison: `Left Op Right`.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminationCondition {
    #[serde(rename = "Left")]
    pub left: TerminationOperand,
    #[serde(rename = "Op")]
    pub op: ComparisonOp,
    #[serde(rename = "Right")]
    pub right: TerminationOperand,
}

/// The resolution a satisfied termination condition assigns to the players
/// named by its `Players` field.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum TerminationResolution {
    Win,
    Lose,
    Draw,
    End,
}

/// Which players a termination's resolution applies to.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum TerminationPlayers {
    All,
    Specific(Vec<u32>),
}

/// One entry under the top-level `Terminations` list.
#[derive(Debug, Clone, Deserialize)]
pub struct TerminationDefinition {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Resolution")]
    pub resolution: TerminationResolution,
    #[serde(rename = "Players", default = "all_players")]
    pub players: TerminationPlayers,
    #[serde(rename = "Condition")]
    pub condition: TerminationCondition,
}

fn all_players() -> TerminationPlayers {
    TerminationPlayers::All
}

/// The `Environment` block.
#[derive(Debug, Clone, Deserialize)]
pub struct EnvironmentDefinition {
    #[serde(rename = "TileSize", default = "default_tile_size")]
    pub tile_size: u32,
    #[serde(rename = "Levels", default)]
    pub levels: Vec<String>,
}

fn default_tile_size() -> u32 {
    10
}

/// The whole declarative description, as parsed from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct Description {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Environment")]
    pub environment: EnvironmentDefinition,
    #[serde(rename = "Objects")]
    pub objects: Vec<ObjectDefinition>,
    #[serde(rename = "Actions", default)]
    pub actions: Vec<ActionDefinition>,
    #[serde(rename = "Terminations", default)]
    pub terminations: Vec<TerminationDefinition>,
}

impl Description {
    /// Parse and validate a description from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        let description: Description = serde_yaml::from_str(yaml)?;
        description.validate()?;
        info!(
            version = %description.version,
            objects = description.objects.len(),
            actions = description.actions.len(),
            terminations = description.terminations.len(),
            "loaded description"
        );
        Ok(description)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        let mut by_name: HashMap<&str, ()> = HashMap::new();
        let mut by_char: HashMap<char, &str> = HashMap::new();
        for object in &self.objects {
            if by_name.insert(object.name.as_str(), ()).is_some() {
                return Err(ManifestError::DuplicateKind(object.name.clone()));
            }
            if let Some(owner) = by_char.insert(object.map_character, object.name.as_str()) {
                return Err(ManifestError::DuplicateMapChar(
                    object.map_character,
                    owner.to_owned(),
                    object.name.clone(),
                ));
            }
            debug!(name = %object.name, map_character = %object.map_character, "registered object kind");
        }

        let known_kind = |name: &str| by_name.contains_key(name);
        for action in &self.actions {
            for behaviour in &action.behaviours {
                for kind in behaviour.src.types.iter().chain(behaviour.dst.types.iter()) {
                    if !known_kind(kind) {
                        return Err(ManifestError::UnknownKind(kind.clone()));
                    }
                }
            }
            debug!(name = %action.name, behaviours = action.behaviours.len(), "registered action");
        }

        for termination in &self.terminations {
            for operand in [&termination.condition.left, &termination.condition.right] {
                if let TerminationOperand::ObjectCount { kind } = operand {
                    if !known_kind(kind) {
                        return Err(ManifestError::UnknownKind(kind.clone()));
                    }
                }
            }
        }

        Ok(())
    }
}
