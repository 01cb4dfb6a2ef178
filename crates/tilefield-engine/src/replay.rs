//! Deterministic replay, grounded on the teacher's replay-recorder pattern
//! (record inputs + periodic state-hash checkpoints, then re-drive a fresh
//! process and compare hashes) but adapted to this engine's action model.
//!
//! Recorded actions address their source/destination by grid location
//! rather than by live handle, since handles are only meaningful within the
//! arena that issued them and a replay reconstructs a brand-new one.

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionVector, Descriptor};
use crate::error::EngineError;
use crate::object::{Location, PlayerId};
use crate::process::GameProcess;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordedVector {
    Forward,
    TurnLeft,
    TurnRight,
    Delta(i32, i32),
}

impl From<RecordedVector> for ActionVector {
    fn from(v: RecordedVector) -> Self {
        match v {
            RecordedVector::Forward => ActionVector::Forward,
            RecordedVector::TurnLeft => ActionVector::TurnLeft,
            RecordedVector::TurnRight => ActionVector::TurnRight,
            RecordedVector::Delta(dx, dy) => ActionVector::Delta(dx, dy),
        }
    }
}

/// A serializable recording of one [`Action`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedAction {
    pub name: String,
    pub player_id: PlayerId,
    pub source: Location,
    pub destination: Location,
    pub vector: RecordedVector,
}

impl From<&RecordedAction> for Action {
    fn from(recorded: &RecordedAction) -> Self {
        Action::new(
            recorded.name.clone(),
            recorded.player_id,
            Descriptor::Location(recorded.source),
            Descriptor::Location(recorded.destination),
            recorded.vector.clone().into(),
        )
    }
}

/// One recorded `perform_actions` call, with an optional state-hash
/// checkpoint captured immediately after it ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedTick {
    pub actions: Vec<RecordedAction>,
    pub advance_tick: bool,
    pub checkpoint_hash: Option<String>,
}

/// A complete replay log: the level to initialize from, plus the ordered
/// sequence of recorded ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    pub level_text: String,
    pub ticks: Vec<RecordedTick>,
}

/// Accumulates a [`ReplayLog`] while driving a live [`GameProcess`].
pub struct ReplayRecorder {
    level_text: String,
    ticks: Vec<RecordedTick>,
    checkpoint_every: usize,
}

impl ReplayRecorder {
    pub fn new(level_text: impl Into<String>, checkpoint_every: usize) -> Self {
        Self {
            level_text: level_text.into(),
            ticks: Vec::new(),
            checkpoint_every: checkpoint_every.max(1),
        }
    }

    /// Call after `process.perform_actions(...)` has already run for this
    /// tick -- the checkpoint hash, when taken, is of the resulting state.
    pub fn record_tick(&mut self, actions: Vec<RecordedAction>, advance_tick: bool, process: &GameProcess) {
        let index = self.ticks.len();
        let checkpoint_hash = (index % self.checkpoint_every == 0).then(|| process.state_hash());
        self.ticks.push(RecordedTick {
            actions,
            advance_tick,
            checkpoint_hash,
        });
    }

    pub fn finish(self) -> ReplayLog {
        ReplayLog {
            level_text: self.level_text,
            ticks: self.ticks,
        }
    }
}

/// Outcome of replaying a [`ReplayLog`] against a freshly-initialized
/// process.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    pub completed: bool,
    pub first_divergence: Option<usize>,
}

/// Re-initialize `process` from `log.level_text` and feed it the recorded
/// ticks, comparing state hashes at every recorded checkpoint.
pub fn replay(process: &mut GameProcess, log: &ReplayLog) -> Result<ReplayOutcome, EngineError> {
    process.set_level_text(log.level_text.clone());
    process.init(false)?;

    for (index, tick) in log.ticks.iter().enumerate() {
        let actions: Vec<Action> = tick.actions.iter().map(Action::from).collect();
        process.perform_actions(actions, tick.advance_tick)?;
        if let Some(expected) = &tick.checkpoint_hash {
            if &process.state_hash() != expected {
                return Ok(ReplayOutcome {
                    completed: false,
                    first_divergence: Some(index),
                });
            }
        }
    }

    Ok(ReplayOutcome {
        completed: true,
        first_divergence: None,
    })
}
