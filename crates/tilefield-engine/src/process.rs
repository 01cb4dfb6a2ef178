//! Game Process (spec §4.G): the per-tick orchestrator.
//!
//! Owns its [`Grid`], a reference to the immutable compiled description, and
//! its [`Observer`]'s lifecycle. Per spec §5, many `GameProcess` instances
//! may run concurrently provided they share only the read-only
//! [`CompiledDescription`] -- hence it is taken behind an `Arc`.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tilefield_manifest::Description;
use tracing::{info, warn};

use crate::action::Action;
use crate::behaviour::{resolve_action, CompiledBehaviourTable, ResolutionEnv};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::kind::KindRegistry;
use crate::level::parse_level;
use crate::object::{Location, Orientation, PlayerId};
use crate::observer::{Frame, Observer};
use crate::termination::{TerminalState, TerminationHandler};

/// The immutable, compiled form of a declarative description. Shared
/// read-only across every `GameProcess` running it.
pub struct CompiledDescription {
    pub kinds: KindRegistry,
    pub table: CompiledBehaviourTable,
    pub termination: TerminationHandler,
    pub levels: Vec<String>,
}

impl CompiledDescription {
    pub fn compile(description: &Description) -> Result<Self, EngineError> {
        let kinds = KindRegistry::compile(description)?;
        let table = CompiledBehaviourTable::compile(description);
        let termination = TerminationHandler::new(description.terminations.clone());
        info!(
            objects = description.objects.len(),
            actions = description.actions.len(),
            terminations = description.terminations.len(),
            "compiled description"
        );
        Ok(Self {
            kinds,
            table,
            termination,
            levels: description.environment.levels.clone(),
        })
    }
}

/// Injected at construction (spec §9 design note: configuration is a
/// constructor argument, never mutable global state).
#[derive(Debug, Clone, Copy)]
pub struct GameProcessConfig {
    pub auto_reset: bool,
    pub max_cascade_depth: usize,
}

impl Default for GameProcessConfig {
    fn default() -> Self {
        Self {
            auto_reset: false,
            max_cascade_depth: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameProcessState {
    Constructed,
    Initialized,
    Running,
    Terminal,
}

/// One `perform_actions` result.
#[derive(Debug, Clone)]
pub struct PerformActionsResult {
    pub terminal_states: HashMap<PlayerId, TerminalState>,
    pub terminated: bool,
}

/// Record emitted once per live object by [`GameProcess::state`].
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    pub name: String,
    pub variables: HashMap<String, i32>,
    pub location: Location,
    pub orientation: Orientation,
    pub player_id: PlayerId,
}

/// Exported simulation state.
#[derive(Debug, Clone)]
pub struct StateInfo {
    pub game_ticks: u64,
    pub global_variables: HashMap<String, HashMap<PlayerId, i32>>,
    pub object_info: Vec<ObjectInfo>,
}

enum Level {
    Id(usize),
    Text(String),
}

/// The per-tick orchestrator: dispatches actions, runs behaviours, updates
/// termination, collects rewards, owns observer lifecycle and reset.
pub struct GameProcess {
    compiled: Arc<CompiledDescription>,
    config: GameProcessConfig,
    observer: Box<dyn Observer>,
    grid: Grid,
    state: GameProcessState,
    level: Option<Level>,
    rewards: HashMap<PlayerId, i32>,
    connected_players: Vec<PlayerId>,
    terminal_states: HashMap<PlayerId, TerminalState>,
}

impl GameProcess {
    pub fn new(
        compiled: Arc<CompiledDescription>,
        config: GameProcessConfig,
        connected_players: Vec<PlayerId>,
        observer: Box<dyn Observer>,
    ) -> Self {
        Self {
            compiled,
            config,
            observer,
            grid: Grid::new(),
            state: GameProcessState::Constructed,
            level: None,
            rewards: HashMap::new(),
            connected_players,
            terminal_states: HashMap::new(),
        }
    }

    pub fn state_kind(&self) -> GameProcessState {
        self.state
    }

    /// Select a level by index into the description's `Environment.Levels`.
    pub fn set_level_id(&mut self, id: usize) {
        self.level = Some(Level::Id(id));
    }

    /// Select an ad hoc level by its raw text.
    pub fn set_level_text(&mut self, text: impl Into<String>) {
        self.level = Some(Level::Text(text.into()));
    }

    fn level_text(&self) -> Result<&str, EngineError> {
        match &self.level {
            Some(Level::Text(text)) => Ok(text.as_str()),
            Some(Level::Id(id)) => self
                .compiled
                .levels
                .get(*id)
                .map(String::as_str)
                .ok_or_else(|| EngineError::InvalidLevel(format!("no level at index {id}"))),
            None => Err(EngineError::InvalidLevel("no level selected".to_owned())),
        }
    }

    fn generate_level(&mut self) -> Result<(), EngineError> {
        let parsed = parse_level(self.level_text()?, &self.compiled.kinds)?;
        self.grid.reinit(parsed.width, parsed.height);
        for placement in parsed.placements {
            let object = self.compiled.kinds.instantiate(
                &placement.kind,
                placement.player_id,
                placement.location,
                placement.orientation,
            )?;
            self.grid.add_object(object)?;
        }
        self.observer.init(self.grid.width(), self.grid.height());
        Ok(())
    }

    /// Generate the level into the grid, create/reset observers, reset
    /// accumulated rewards. `is_cloned` is accepted for interface parity with
    /// the source's lifecycle method; this implementation's initialization
    /// is already idempotent with respect to cloning (a freshly-constructed
    /// process has nothing to preserve).
    pub fn init(&mut self, _is_cloned: bool) -> Result<Frame, EngineError> {
        self.generate_level()?;
        self.rewards.clear();
        self.terminal_states.clear();
        self.state = GameProcessState::Initialized;
        Ok(self.observer.reset(&mut self.grid, &self.compiled.kinds))
    }

    /// Re-initialize grid contents from the level template, zero rewards,
    /// and return a fresh observation from the observer.
    pub fn reset(&mut self) -> Result<Frame, EngineError> {
        self.generate_level()?;
        self.rewards.clear();
        self.terminal_states.clear();
        self.state = GameProcessState::Initialized;
        Ok(self.observer.reset(&mut self.grid, &self.compiled.kinds))
    }

    /// Validate, resolve via the behaviour table, collect rewards, evaluate
    /// termination, optionally advance the tick.
    pub fn perform_actions(
        &mut self,
        actions: Vec<Action>,
        advance_tick: bool,
    ) -> Result<PerformActionsResult, EngineError> {
        match self.state {
            GameProcessState::Constructed => return Err(EngineError::NotInitialized),
            GameProcessState::Terminal => {
                if self.config.auto_reset {
                    self.reset()?;
                } else {
                    return Err(EngineError::RequiresReset);
                }
            }
            GameProcessState::Initialized | GameProcessState::Running => {}
        }
        self.state = GameProcessState::Running;

        let rollback = self.grid.clone();
        let rewards_rollback = self.rewards.clone();
        // Tie-break: player-id ascending, then submission order within that
        // player's batch (spec §4.D). `Action` already carries its own
        // `player_id`, so a stable sort over the submitted batch realizes the
        // rule directly instead of requiring the caller to split one call per
        // player.
        let mut ordered = actions;
        ordered.sort_by_key(|a| a.player_id);
        let mut queue: VecDeque<(Action, usize)> = ordered.into_iter().map(|a| (a, 0)).collect();

        while let Some((action, depth)) = queue.pop_front() {
            let mut env = ResolutionEnv {
                grid: &mut self.grid,
                kinds: &self.compiled.kinds,
                table: &self.compiled.table,
                rewards: &mut self.rewards,
                cascade_queue: &mut queue,
                max_cascade_depth: self.config.max_cascade_depth,
            };
            match resolve_action(&action, depth, &mut env) {
                Ok(()) => {}
                Err(EngineError::InvalidAction(name)) => {
                    warn!(action = name, "invalid action, no-op with zero reward");
                }
                Err(EngineError::CascadeOverflow(max)) => {
                    self.grid = rollback;
                    self.rewards = rewards_rollback;
                    return Err(EngineError::CascadeOverflow(max));
                }
                Err(other) => return Err(other),
            }
        }

        let fired = self
            .compiled
            .termination
            .evaluate(&self.grid, &self.rewards, &self.connected_players);
        let terminated = fired.is_some();
        if let Some(states) = fired {
            self.terminal_states = states;
            self.state = GameProcessState::Terminal;
        }

        if advance_tick {
            self.grid.tick();
        }

        Ok(PerformActionsResult {
            terminal_states: self.terminal_states.clone(),
            terminated,
        })
    }

    /// BLAKE3 hex digest of the grid's current contents, used by
    /// [`crate::replay`] to verify determinism across a replayed log.
    pub fn state_hash(&self) -> String {
        self.grid.state_hash()
    }

    pub fn accumulated_rewards(&self, player_id: PlayerId) -> i32 {
        self.rewards.get(&player_id).copied().unwrap_or(0)
    }

    pub fn state(&self) -> StateInfo {
        StateInfo {
            game_ticks: self.grid.current_tick(),
            global_variables: self.grid.global_variables().clone(),
            object_info: self
                .grid
                .iter_objects()
                .map(|(_, o)| ObjectInfo {
                    name: o.kind.clone(),
                    variables: o.parameters.clone(),
                    location: o.location,
                    orientation: o.orientation,
                    player_id: o.player_id,
                })
                .collect(),
        }
    }

    /// Pull a fresh frame for `player_id` without resolving any actions.
    pub fn observe(&mut self, player_id: PlayerId) -> Frame {
        self.observer
            .update(player_id, &mut self.grid, &self.compiled.kinds)
    }

    /// Cells whose contents changed since the last call, then clear the set.
    /// A thin pass-through to [`Grid::take_updated_locations`] for callers
    /// (tests, external observers) that want the raw dirty set rather than a
    /// rendered [`Frame`].
    pub fn take_updated_locations(&mut self) -> std::collections::HashSet<Location> {
        self.grid.take_updated_locations()
    }

    /// Tear down observer resources deterministically ahead of scope exit.
    /// Idempotent: calling it more than once, or on a `Constructed` process,
    /// is a no-op.
    pub fn release(&mut self) {
        self.grid = Grid::new();
        self.state = GameProcessState::Constructed;
    }

    /// Action names each of `player_id`'s live objects may currently source,
    /// keyed by the object's location.
    pub fn available_actions_at(&self, player_id: PlayerId) -> Vec<(Location, Vec<String>)> {
        self.grid
            .iter_objects()
            .filter(|(_, o)| o.player_id == player_id)
            .map(|(_, o)| {
                let names = self
                    .compiled
                    .table
                    .actions_for_kind(&o.kind)
                    .map(str::to_owned)
                    .collect();
                (o.location, names)
            })
            .collect()
    }

    /// Which directional variants of `action_name` are currently valid from
    /// `location`: the occupying object's kind must be able to source the
    /// action, and the resulting destination cell must stay in bounds. Ids
    /// follow Griddly's direction numbering (1=North, 2=South, 3=West,
    /// 4=East); useful for an RL agent building a legal-action mask without
    /// probing `perform_actions` speculatively.
    pub fn available_action_ids_at(&self, location: Location, action_name: &str) -> Vec<ActionId> {
        const DIRECTIONS: [(ActionId, (i32, i32)); 4] =
            [(1, (0, -1)), (2, (0, 1)), (3, (-1, 0)), (4, (1, 0))];

        let can_source = self
            .grid
            .cell_at(location.0, location.1)
            .iter()
            .filter_map(|&h| self.grid.object(h))
            .any(|o| self.compiled.table.can_source(&o.kind, action_name));
        if !can_source {
            return Vec::new();
        }

        DIRECTIONS
            .iter()
            .filter(|(_, (dx, dy))| {
                let dest = (location.0 + dx, location.1 + dy);
                dest.0 >= 0 && dest.0 < self.grid.width() && dest.1 >= 0 && dest.1 < self.grid.height()
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Numeric direction id for `available_action_ids_at`, matching Griddly's
/// convention (North=1, South=2, West=3, East=4).
pub type ActionId = u32;
