//! Termination Handler (spec §4.F).
//!
//! Conditions are evaluated in declared order; the first satisfied condition
//! fixes every player's terminal state for the tick. Players named by
//! `Players: Specific([...])` who are not playing receive `NONE`, except
//! under `Resolution: Draw`, which spec §4.F's shorthand applies to all
//! connected players regardless of the `Players` field.

use std::collections::HashMap;

use tilefield_manifest::{TerminationDefinition, TerminationOperand, TerminationPlayers};

use crate::grid::Grid;
use crate::object::PlayerId;

/// A single player's terminal state after evaluating terminations for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Win,
    Lose,
    None,
}

/// Read-only handler bound to a description's `Terminations` list.
#[derive(Debug, Clone, Default)]
pub struct TerminationHandler {
    conditions: Vec<TerminationDefinition>,
}

impl TerminationHandler {
    pub fn new(conditions: Vec<TerminationDefinition>) -> Self {
        Self { conditions }
    }

    fn operand_value(operand: &TerminationOperand, grid: &Grid, rewards: &HashMap<PlayerId, i32>) -> i64 {
        match operand {
            TerminationOperand::GlobalVariable { name, player } => grid.global(name, *player),
            TerminationOperand::Reward { player } => *rewards.get(player).unwrap_or(&0) as i64,
            TerminationOperand::ObjectCount { kind } => grid.count_kind(kind),
            TerminationOperand::Const(value) => *value,
        }
    }

    /// Evaluate conditions in order for `connected_players`, returning
    /// per-player terminal states. `None` means no condition fired this
    /// tick; `Some(_)` means the episode has terminated, even if every
    /// player's individual state came out `NONE` (a `Draw`/`End`
    /// resolution).
    pub fn evaluate(
        &self,
        grid: &Grid,
        rewards: &HashMap<PlayerId, i32>,
        connected_players: &[PlayerId],
    ) -> Option<HashMap<PlayerId, TerminalState>> {
        for condition in &self.conditions {
            let lhs = Self::operand_value(&condition.condition.left, grid, rewards);
            let rhs = Self::operand_value(&condition.condition.right, grid, rewards);
            if condition.condition.op.evaluate(lhs, rhs) {
                return Some(Self::resolve(condition, connected_players));
            }
        }
        None
    }

    fn resolve(
        condition: &TerminationDefinition,
        connected_players: &[PlayerId],
    ) -> HashMap<PlayerId, TerminalState> {
        use tilefield_manifest::TerminationResolution as R;

        let winners: Vec<PlayerId> = match &condition.players {
            TerminationPlayers::All => connected_players.to_vec(),
            TerminationPlayers::Specific(ids) => ids.clone(),
        };

        let mut states: HashMap<PlayerId, TerminalState> = connected_players
            .iter()
            .map(|&p| (p, TerminalState::None))
            .collect();

        match condition.resolution {
            R::Win => {
                for p in winners {
                    states.insert(p, TerminalState::Win);
                }
            }
            R::Lose => {
                for p in winners {
                    states.insert(p, TerminalState::Lose);
                }
            }
            // The per-player terminal state enum only has WIN/LOSE/NONE, so
            // both shorthands that don't pick a winner resolve to NONE for
            // everyone; the episode still terminates because `evaluate`
            // returned `Some(_)`.
            R::Draw | R::End => {}
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilefield_manifest::{ComparisonOp, TerminationCondition};

    fn win_on_zero_minerals() -> TerminationHandler {
        TerminationHandler::new(vec![TerminationDefinition {
            name: "harvest-complete".to_owned(),
            resolution: tilefield_manifest::TerminationResolution::Win,
            players: TerminationPlayers::All,
            condition: TerminationCondition {
                left: TerminationOperand::ObjectCount {
                    kind: "minerals".to_owned(),
                },
                op: ComparisonOp::Eq,
                right: TerminationOperand::Const(0),
            },
        }])
    }

    #[test]
    fn fires_win_when_minerals_exhausted() {
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        let handler = win_on_zero_minerals();
        let rewards = HashMap::new();
        let states = handler.evaluate(&grid, &rewards, &[1]).unwrap();
        assert_eq!(states.get(&1), Some(&TerminalState::Win));
    }

    #[test]
    fn no_condition_fires_while_minerals_remain() {
        use crate::object::{Object, Orientation};
        let mut grid = Grid::new();
        grid.init(2, 2).unwrap();
        grid.add_object(Object::new(
            "minerals",
            0,
            (0, 0),
            Orientation::North,
            0,
            HashMap::new(),
        ))
        .unwrap();
        let handler = win_on_zero_minerals();
        let rewards = HashMap::new();
        assert!(handler.evaluate(&grid, &rewards, &[1]).is_none());
    }
}
