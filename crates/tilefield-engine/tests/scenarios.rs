//! Integration tests for the harvester/minerals scenarios.

use std::collections::HashSet;
use std::sync::Arc;

use tilefield_engine::prelude::*;
use tilefield_manifest::Description;

const HARVEST_YAML: &str = r#"
Version: "0.1"
Environment:
  Levels: ["HM"]
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
            - eq:
                Params: [value, 0]
                Cmd:
                  - remove: true
Terminations:
  - Name: harvest-complete
    Resolution: Win
    Condition:
      Left: {ObjectCount: {Kind: minerals}}
      Op: Eq
      Right: {Const: 0}
"#;

fn new_process(auto_reset: bool) -> GameProcess {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let description = Description::from_yaml(HARVEST_YAML).unwrap();
    let compiled = Arc::new(CompiledDescription::compile(&description).unwrap());
    let config = GameProcessConfig {
        auto_reset,
        max_cascade_depth: 16,
    };
    let mut process = GameProcess::new(compiled, config, vec![1, 2], Box::new(VectorObserver::new()));
    process.set_level_id(0);
    process.init(false).unwrap();
    process
}

fn gather(player_id: PlayerId, dest: Location) -> Action {
    Action::new(
        "gather",
        player_id,
        Descriptor::Location((0, 0)),
        Descriptor::Location(dest),
        ActionVector::Delta(1, 0),
    )
}

#[test]
fn s1_single_gather_rewards_and_marks_destination_dirty() {
    let mut process = new_process(false);
    let result = process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    assert_eq!(process.accumulated_rewards(1), 1);
    assert!(!result.terminated);
    let state = process.state();
    let minerals = state
        .object_info
        .iter()
        .find(|o| o.name == "minerals")
        .unwrap();
    assert_eq!(minerals.variables.get("value"), Some(&9));

    let dirty = process.take_updated_locations();
    assert_eq!(dirty, HashSet::from([(1, 0)]));
}

#[test]
fn s2_ten_gathers_remove_minerals() {
    let mut process = new_process(false);
    for _ in 0..9 {
        process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    }
    let before = process.state();
    assert!(before.object_info.iter().any(|o| o.name == "minerals"));

    let result = process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    assert_eq!(process.accumulated_rewards(1), 10);
    assert!(result.terminated);
    let after = process.state();
    assert!(!after.object_info.iter().any(|o| o.name == "minerals"));
}

#[test]
fn s3_out_of_bounds_destination_is_invalid_action() {
    let mut process = new_process(false);
    let result = process.perform_actions(vec![gather(1, (2, 0))], true).unwrap();
    assert_eq!(process.accumulated_rewards(1), 0);
    assert!(!result.terminated);
    assert_eq!(process.state().game_ticks, 1);
}

#[test]
fn s4_two_players_resolve_in_submission_order() {
    let mut process = new_process(false);
    let result = process
        .perform_actions(vec![gather(1, (1, 0)), gather(2, (1, 0))], true)
        .unwrap();
    assert_eq!(process.accumulated_rewards(1), 1);
    assert_eq!(process.accumulated_rewards(2), 1);
    assert!(!result.terminated);
    let minerals_value = process
        .state()
        .object_info
        .iter()
        .find(|o| o.name == "minerals")
        .unwrap()
        .variables
        .get("value")
        .copied()
        .unwrap();
    assert_eq!(minerals_value, 8);
}

#[test]
fn s5_termination_yields_win_for_all_connected_players() {
    let mut process = new_process(false);
    let mut result = None;
    for _ in 0..10 {
        result = Some(process.perform_actions(vec![gather(1, (1, 0))], true).unwrap());
    }
    let result = result.unwrap();
    assert!(result.terminated);
    assert_eq!(result.terminal_states.get(&1), Some(&TerminalState::Win));
}

#[test]
fn s6_requires_reset_then_reproduces_initial_state_bit_for_bit() {
    let mut process = new_process(false);
    let fresh_hash = process.state_hash();
    for _ in 0..10 {
        process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    }
    assert!(matches!(
        process.perform_actions(vec![], true),
        Err(EngineError::RequiresReset)
    ));

    process.reset().unwrap();
    assert_eq!(process.accumulated_rewards(1), 0);
    assert_eq!(process.state().game_ticks, 0);
    assert_eq!(process.state_hash(), fresh_hash);

    process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    assert_eq!(process.accumulated_rewards(1), 1);
}

#[test]
fn available_action_ids_at_excludes_out_of_bounds_directions() {
    let process = new_process(false);
    // The harvester sits at (0, 0) on a 2x1 grid: North/South/West all run
    // off the grid, only East (id 4) stays in bounds.
    let ids = process.available_action_ids_at((0, 0), "gather");
    assert_eq!(ids, vec![4]);

    assert!(process.available_action_ids_at((0, 0), "no-such-action").is_empty());
}

#[test]
fn auto_reset_allows_perform_actions_after_termination() {
    let mut process = new_process(true);
    for _ in 0..10 {
        process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    }
    let result = process.perform_actions(vec![gather(1, (1, 0))], true).unwrap();
    assert_eq!(process.accumulated_rewards(1), 1);
    assert!(!result.terminated);
}
