//! Command Library (spec §4.E): primitive command implementations.
//!
//! Every primitive reports success or a typed, *contained* failure --
//! [`CommandFailure`] never escapes [`execute_commands`] except
//! `CascadeOverflow`, which aborts the whole tick (spec §7 propagation
//! policy). Conditional commands (`eq`/`gt`/`lt`) resolve their operands
//! against a parameter map assembled from the acting object, its
//! counterpart, and global variables, mirroring the resolution order
//! described in spec §4.D step 4.

use std::collections::{HashMap, VecDeque};

use tilefield_manifest::CommandInvocation;
use tracing::{debug, warn};

use crate::action::{Action, ActionVector, Descriptor};
use crate::grid::Grid;
use crate::kind::KindRegistry;
use crate::object::{ObjectHandle, PlayerId};

/// A command-level failure. Contained within the action that produced it;
/// only [`CommandFailure::CascadeOverflow`] propagates out of
/// [`execute_commands`] to abort and roll back the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    /// Movement blocked: destination out of bounds or occupied.
    Blocked,
    /// A conditional operand or a parameter command referenced an unknown
    /// name; the command is skipped.
    UnknownParameter(String),
    /// `change_to` named a kind the registry has no record of.
    UnknownKind(String),
    /// Cascaded past the configured maximum depth.
    CascadeOverflow,
}

/// Mutable state threaded through one action's command-list execution.
pub struct CommandContext<'a> {
    pub grid: &'a mut Grid,
    pub kinds: &'a KindRegistry,
    pub action: &'a Action,
    /// The object this command list is attached to: the source object when
    /// running the SOURCE list, the destination object when running the
    /// DESTINATION list.
    pub actor: ObjectHandle,
    /// The other participant, if the destination cell was occupied.
    pub counterpart: Option<ObjectHandle>,
    pub rewards: &'a mut HashMap<PlayerId, i32>,
    pub cascade_queue: &'a mut VecDeque<(Action, usize)>,
    pub depth: usize,
    pub max_cascade_depth: usize,
}

/// Run an ordered command list in declared order. Non-cascade failures are
/// logged and do not stop the list; `CascadeOverflow` aborts immediately.
pub fn execute_commands(
    commands: &[CommandInvocation],
    ctx: &mut CommandContext,
) -> Result<(), CommandFailure> {
    for command in commands {
        if let Err(failure) = execute_one(command, ctx) {
            if failure == CommandFailure::CascadeOverflow {
                return Err(failure);
            }
            debug!(command = %command.name, ?failure, "command failed, continuing");
        }
    }
    Ok(())
}

fn execute_one(command: &CommandInvocation, ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    match command.name.as_str() {
        "mov" => mov(ctx),
        "cascade" => cascade(ctx),
        "reward" => reward(command, ctx),
        "remove" => remove(ctx),
        "change_to" => change_to(command, ctx),
        "incr" => adjust_parameter(command, ctx, 1),
        "decr" => adjust_parameter(command, ctx, -1),
        "set" => set_parameter(command, ctx),
        "eq" => predicate(command, ctx, |lhs, rhs| lhs == rhs),
        "gt" => predicate(command, ctx, |lhs, rhs| lhs > rhs),
        "lt" => predicate(command, ctx, |lhs, rhs| lhs < rhs),
        other => {
            warn!(command = other, "unrecognised command name, skipping");
            Ok(())
        }
    }
}

fn mov(ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    let object = ctx.grid.object(ctx.actor).ok_or(CommandFailure::Blocked)?;
    let orientation = object.orientation;
    if let Some(turned) = ctx.action.vector.rotation(orientation) {
        ctx.grid
            .set_orientation(ctx.actor, turned)
            .map_err(|_| CommandFailure::Blocked)?;
        return Ok(());
    }
    let (dx, dy) = ctx.action.vector.translation(orientation);
    let (x, y) = object.location;
    ctx.grid
        .move_object(ctx.actor, (x + dx, y + dy))
        .map_err(|_| CommandFailure::Blocked)
}

fn cascade(ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    let next_depth = ctx.depth + 1;
    if next_depth > ctx.max_cascade_depth {
        return Err(CommandFailure::CascadeOverflow);
    }
    let Some(origin) = ctx.counterpart else {
        debug!("cascade with no destination object, skipping");
        return Ok(());
    };
    let origin_object = ctx.grid.object(origin).ok_or(CommandFailure::Blocked)?;
    let orientation = origin_object.orientation;
    let (dx, dy) = ctx.action.vector.translation(orientation);
    let (x, y) = origin_object.location;
    let destination = (x + dx, y + dy);

    let reissued = Action::new(
        ctx.action.name.clone(),
        ctx.action.player_id,
        Descriptor::Object(origin),
        Descriptor::Location(destination),
        ctx.action.vector,
    );
    ctx.cascade_queue.push_back((reissued, next_depth));
    Ok(())
}

fn reward(command: &CommandInvocation, ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    let amount: i32 = command
        .params
        .first()
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| CommandFailure::UnknownParameter("reward amount".to_owned()))?;
    *ctx.rewards.entry(ctx.action.player_id).or_insert(0) += amount;
    Ok(())
}

fn remove(ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    ctx.grid
        .remove_object(ctx.actor)
        .map(|_| ())
        .map_err(|_| CommandFailure::Blocked)
}

fn change_to(command: &CommandInvocation, ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    let new_kind = command
        .params
        .first()
        .ok_or_else(|| CommandFailure::UnknownParameter("change_to target".to_owned()))?;
    let (player_id, location, orientation) = {
        let object = ctx.grid.object(ctx.actor).ok_or(CommandFailure::Blocked)?;
        (object.player_id, object.location, object.orientation)
    };
    let replacement = ctx
        .kinds
        .instantiate(new_kind, player_id, location, orientation)
        .map_err(|_| CommandFailure::UnknownKind(new_kind.clone()))?;
    ctx.grid
        .remove_object(ctx.actor)
        .map_err(|_| CommandFailure::Blocked)?;
    ctx.grid
        .add_object(replacement)
        .map(|_| ())
        .map_err(|_| CommandFailure::Blocked)
}

fn adjust_parameter(
    command: &CommandInvocation,
    ctx: &mut CommandContext,
    sign: i32,
) -> Result<(), CommandFailure> {
    let name = command
        .params
        .first()
        .ok_or_else(|| CommandFailure::UnknownParameter("parameter name".to_owned()))?;
    let amount: i32 = command
        .params
        .get(1)
        .map(|s| s.parse().unwrap_or(1))
        .unwrap_or(1);
    let object = ctx.grid.object_mut(ctx.actor).ok_or(CommandFailure::Blocked)?;
    let entry = object.parameters.entry(name.clone()).or_insert(0);
    *entry += sign * amount;
    let location = object.location;
    ctx.grid.mark_dirty(location);
    Ok(())
}

fn set_parameter(command: &CommandInvocation, ctx: &mut CommandContext) -> Result<(), CommandFailure> {
    let name = command
        .params
        .first()
        .ok_or_else(|| CommandFailure::UnknownParameter("parameter name".to_owned()))?;
    let value: i32 = command
        .params
        .get(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CommandFailure::UnknownParameter("parameter value".to_owned()))?;
    let object = ctx.grid.object_mut(ctx.actor).ok_or(CommandFailure::Blocked)?;
    object.parameters.insert(name.clone(), value);
    let location = object.location;
    ctx.grid.mark_dirty(location);
    Ok(())
}

fn predicate(
    command: &CommandInvocation,
    ctx: &mut CommandContext,
    compare: impl Fn(i64, i64) -> bool,
) -> Result<(), CommandFailure> {
    let lhs_token = command
        .params
        .first()
        .ok_or_else(|| CommandFailure::UnknownParameter("predicate lhs".to_owned()))?;
    let rhs_token = command
        .params
        .get(1)
        .ok_or_else(|| CommandFailure::UnknownParameter("predicate rhs".to_owned()))?;
    let lhs = resolve_operand(lhs_token, ctx)?;
    let rhs = resolve_operand(rhs_token, ctx)?;
    if compare(lhs, rhs) {
        if let Some(nested) = &command.conditional {
            execute_commands(nested, ctx)?;
        }
    }
    Ok(())
}

/// Resolve a predicate operand: an integer literal, or else a parameter name
/// looked up on the actor, then the counterpart, then engine-wide globals.
fn resolve_operand(token: &str, ctx: &CommandContext) -> Result<i64, CommandFailure> {
    if let Ok(n) = token.parse::<i64>() {
        return Ok(n);
    }
    if let Some(object) = ctx.grid.object(ctx.actor) {
        if let Some(v) = object.parameters.get(token) {
            return Ok(*v as i64);
        }
    }
    if let Some(handle) = ctx.counterpart {
        if let Some(object) = ctx.grid.object(handle) {
            if let Some(v) = object.parameters.get(token) {
                return Ok(*v as i64);
            }
        }
    }
    let global = ctx.grid.global(token, 0);
    if global != 0 || ctx.grid.global_variables().contains_key(token) {
        return Ok(global);
    }
    Err(CommandFailure::UnknownParameter(token.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Object, Orientation};
    use tilefield_manifest::Description;

    fn test_grid() -> Grid {
        let mut grid = Grid::new();
        grid.init(4, 4).unwrap();
        grid
    }

    fn registry() -> KindRegistry {
        let desc = Description::from_yaml(
            r#"
Version: "0.1"
Environment: { Levels: ["HM"] }
Objects:
  - {Name: harvester, MapCharacter: H}
  - Name: minerals
    MapCharacter: M
    Parameters: [{Name: value, InitialValue: 10}]
"#,
        )
        .unwrap();
        KindRegistry::compile(&desc).unwrap()
    }

    fn action() -> Action {
        Action::new(
            "gather",
            1,
            Descriptor::Location((0, 0)),
            Descriptor::Location((1, 0)),
            ActionVector::Delta(1, 0),
        )
    }

    #[test]
    fn reward_credits_issuing_player() {
        let mut grid = test_grid();
        let kinds = registry();
        let h = grid
            .add_object(Object::new(
                "harvester",
                1,
                (0, 0),
                Orientation::North,
                0,
                HashMap::new(),
            ))
            .unwrap();
        let mut rewards = HashMap::new();
        let mut queue = VecDeque::new();
        let act = action();
        let mut ctx = CommandContext {
            grid: &mut grid,
            kinds: &kinds,
            action: &act,
            actor: h,
            counterpart: None,
            rewards: &mut rewards,
            cascade_queue: &mut queue,
            depth: 0,
            max_cascade_depth: 16,
        };
        let cmd = CommandInvocation {
            name: "reward".to_owned(),
            params: vec!["1".to_owned()],
            conditional: None,
        };
        execute_commands(std::slice::from_ref(&cmd), &mut ctx).unwrap();
        assert_eq!(rewards.get(&1), Some(&1));
    }

    #[test]
    fn decr_then_eq_removes_at_zero() {
        let mut grid = test_grid();
        let kinds = registry();
        let m = grid
            .add_object(Object::new(
                "minerals",
                0,
                (1, 0),
                Orientation::North,
                0,
                HashMap::from([("value".to_owned(), 1)]),
            ))
            .unwrap();
        let mut rewards = HashMap::new();
        let mut queue = VecDeque::new();
        let act = action();
        let mut ctx = CommandContext {
            grid: &mut grid,
            kinds: &kinds,
            action: &act,
            actor: m,
            counterpart: None,
            rewards: &mut rewards,
            cascade_queue: &mut queue,
            depth: 0,
            max_cascade_depth: 16,
        };
        let commands = vec![
            CommandInvocation {
                name: "decr".to_owned(),
                params: vec!["value".to_owned()],
                conditional: None,
            },
            CommandInvocation {
                name: "eq".to_owned(),
                params: vec!["value".to_owned(), "0".to_owned()],
                conditional: Some(vec![CommandInvocation {
                    name: "remove".to_owned(),
                    params: vec!["true".to_owned()],
                    conditional: None,
                }]),
            },
        ];
        execute_commands(&commands, &mut ctx).unwrap();
        assert!(!ctx.grid.object(m).is_some());
    }

    #[test]
    fn cascade_overflow_propagates() {
        let mut grid = test_grid();
        let kinds = registry();
        let h = grid
            .add_object(Object::new(
                "harvester",
                1,
                (0, 0),
                Orientation::North,
                0,
                HashMap::new(),
            ))
            .unwrap();
        let mut rewards = HashMap::new();
        let mut queue = VecDeque::new();
        let act = action();
        let mut ctx = CommandContext {
            grid: &mut grid,
            kinds: &kinds,
            action: &act,
            actor: h,
            counterpart: Some(h),
            rewards: &mut rewards,
            cascade_queue: &mut queue,
            depth: 16,
            max_cascade_depth: 16,
        };
        let cmd = CommandInvocation {
            name: "cascade".to_owned(),
            params: vec![],
            conditional: None,
        };
        let err = execute_commands(std::slice::from_ref(&cmd), &mut ctx).unwrap_err();
        assert_eq!(err, CommandFailure::CascadeOverflow);
    }
}
