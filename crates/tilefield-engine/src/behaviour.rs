//! Behaviour Table (spec §4.D): compiled (action, source-kind,
//! destination-kind) -> ordered command list lookup, and the single-action
//! resolution algorithm built on top of it.
//!
//! Compilation iterates every command in a behaviour's `Cmd` sequence, not
//! just the first -- the corrected reading of the Open Question in spec §9
//! (the original loader's `parseActionBehaviours` reads only `commands[0]`
//! inside a loop over `commands[c]`; that bug is not reproduced here).

use std::collections::{HashMap, HashSet, VecDeque};

use tilefield_manifest::{CommandInvocation, Description};

use crate::action::{Action, Descriptor};
use crate::command::{execute_commands, CommandContext, CommandFailure};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::kind::KindRegistry;
use crate::object::{ObjectHandle, PlayerId};

/// The pseudo-kind used to key an empty destination cell.
const EMPTY_KIND: &str = "empty";

type BehaviourKey = (String, String, String);

/// Compiled, read-only behaviour lookup shared by every tick.
#[derive(Debug, Clone, Default)]
pub struct CompiledBehaviourTable {
    source: HashMap<BehaviourKey, Vec<CommandInvocation>>,
    destination: HashMap<BehaviourKey, Vec<CommandInvocation>>,
    /// kind -> set of action names it may play the SOURCE role for; used by
    /// action validity checks and by the available-actions query.
    source_roles: HashMap<String, HashSet<String>>,
}

impl CompiledBehaviourTable {
    pub fn compile(description: &Description) -> Self {
        let mut table = Self::default();
        for action in &description.actions {
            for behaviour in &action.behaviours {
                for src_kind in &behaviour.src.types {
                    table
                        .source_roles
                        .entry(src_kind.clone())
                        .or_default()
                        .insert(action.name.clone());
                    for dst_kind in &behaviour.dst.types {
                        let key = (action.name.clone(), src_kind.clone(), dst_kind.clone());
                        table.source.insert(key.clone(), behaviour.src.commands.clone());
                        table
                            .destination
                            .insert(key, behaviour.dst.commands.clone());
                    }
                }
            }
        }
        table
    }

    pub fn can_source(&self, kind: &str, action_name: &str) -> bool {
        self.source_roles
            .get(kind)
            .is_some_and(|names| names.contains(action_name))
    }

    pub fn source_commands(&self, action: &str, src: &str, dst: &str) -> Option<&[CommandInvocation]> {
        self.source
            .get(&(action.to_owned(), src.to_owned(), dst.to_owned()))
            .map(Vec::as_slice)
    }

    pub fn destination_commands(&self, action: &str, src: &str, dst: &str) -> Option<&[CommandInvocation]> {
        self.destination
            .get(&(action.to_owned(), src.to_owned(), dst.to_owned()))
            .map(Vec::as_slice)
    }

    /// Action names a kind may issue as SOURCE, for legal-action masks.
    pub fn actions_for_kind(&self, kind: &str) -> impl Iterator<Item = &str> {
        self.source_roles
            .get(kind)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }
}

/// Per-tick, mutable environment the resolution pipeline runs against.
pub struct ResolutionEnv<'a> {
    pub grid: &'a mut Grid,
    pub kinds: &'a KindRegistry,
    pub table: &'a CompiledBehaviourTable,
    pub rewards: &'a mut HashMap<PlayerId, i32>,
    pub cascade_queue: &'a mut VecDeque<(Action, usize)>,
    pub max_cascade_depth: usize,
}

fn resolve_handle(descriptor: Descriptor, grid: &Grid, layer: Option<u32>) -> Option<ObjectHandle> {
    match descriptor {
        Descriptor::Object(h) => grid.object(h).map(|_| h),
        Descriptor::Location(loc) => match layer {
            Some(layer) => grid.object_at_layer(loc, layer),
            None => grid.cell_at(loc.0, loc.1).first().copied(),
        },
    }
}

fn location_of(descriptor: Descriptor, grid: &Grid) -> Option<(i32, i32)> {
    match descriptor {
        Descriptor::Location(loc) => Some(loc),
        Descriptor::Object(h) => grid.object(h).map(|o| o.location),
    }
}

/// Resolve a single action per the five-step algorithm in spec §4.D.
/// Returns `Ok(())` when the action ran (even if it had no source/destination
/// side-effect list), `Err(InvalidAction)` when validity failed (contained --
/// the caller credits no reward and continues), or `Err(CascadeOverflow)`
/// when a cascade exceeded `max_cascade_depth` (the caller rolls the whole
/// tick back).
pub fn resolve_action(action: &Action, depth: usize, env: &mut ResolutionEnv) -> Result<(), EngineError> {
    let source_handle = resolve_handle(action.source, env.grid, None)
        .ok_or_else(|| EngineError::InvalidAction(action.name.clone()))?;
    let source_object = env.grid.object(source_handle).expect("resolved above");
    if source_object.player_id != action.player_id {
        return Err(EngineError::InvalidAction(action.name.clone()));
    }
    let source_kind = source_object.kind.clone();
    let source_layer = source_object.layer;
    if !env.table.can_source(&source_kind, &action.name) {
        return Err(EngineError::InvalidAction(action.name.clone()));
    }

    let dest_location = location_of(action.destination, env.grid)
        .ok_or_else(|| EngineError::InvalidAction(action.name.clone()))?;
    if dest_location.0 < 0
        || dest_location.1 < 0
        || dest_location.0 >= env.grid.width()
        || dest_location.1 >= env.grid.height()
    {
        return Err(EngineError::InvalidAction(action.name.clone()));
    }
    let destination_handle = env.grid.object_at_layer(dest_location, source_layer);
    let dest_kind = destination_handle
        .and_then(|h| env.grid.object(h))
        .map(|o| o.kind.clone())
        .unwrap_or_else(|| EMPTY_KIND.to_owned());

    if let Some(commands) = env
        .table
        .source_commands(&action.name, &source_kind, &dest_kind)
        .map(<[CommandInvocation]>::to_vec)
    {
        let mut ctx = CommandContext {
            grid: env.grid,
            kinds: env.kinds,
            action,
            actor: source_handle,
            counterpart: destination_handle,
            rewards: env.rewards,
            cascade_queue: env.cascade_queue,
            depth,
            max_cascade_depth: env.max_cascade_depth,
        };
        if let Err(CommandFailure::CascadeOverflow) = execute_commands(&commands, &mut ctx) {
            return Err(EngineError::CascadeOverflow(env.max_cascade_depth));
        }
    }

    if let Some(destination_handle) = destination_handle {
        if env.grid.object(destination_handle).is_some() {
            if let Some(commands) = env
                .table
                .destination_commands(&action.name, &source_kind, &dest_kind)
                .map(<[CommandInvocation]>::to_vec)
            {
                let mut ctx = CommandContext {
                    grid: env.grid,
                    kinds: env.kinds,
                    action,
                    actor: destination_handle,
                    counterpart: Some(source_handle),
                    rewards: env.rewards,
                    cascade_queue: env.cascade_queue,
                    depth,
                    max_cascade_depth: env.max_cascade_depth,
                };
                if let Err(CommandFailure::CascadeOverflow) = execute_commands(&commands, &mut ctx) {
                    return Err(EngineError::CascadeOverflow(env.max_cascade_depth));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARVEST_YAML: &str = r#"
Version: "0.1"
Environment: { Levels: ["HM"] }
Objects:
  - {Name: harvester, MapCharacter: H}
  - Name: minerals
    MapCharacter: M
    Parameters: [{Name: value, InitialValue: 10}]
Actions:
  - Name: gather
    Behaviours:
      - Src: {Type: harvester, Cmd: [reward: 1]}
        Dst:
          Type: minerals
          Cmd:
            - decr: value
"#;

    #[test]
    fn compiles_source_and_destination_lists() {
        let desc = Description::from_yaml(HARVEST_YAML).unwrap();
        let table = CompiledBehaviourTable::compile(&desc);
        assert!(table.can_source("harvester", "gather"));
        assert!(!table.can_source("minerals", "gather"));
        assert_eq!(
            table
                .source_commands("gather", "harvester", "minerals")
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            table
                .destination_commands("gather", "harvester", "minerals")
                .unwrap()
                .len(),
            1
        );
    }
}
