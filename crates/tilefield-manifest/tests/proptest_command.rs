//! Property tests for `CommandInvocation` parsing.
//!
//! Generates random command names and scalar/sequence parameter shapes and
//! checks that the hand-rolled `Deserialize` recovers them faithfully,
//! regardless of which of the three YAML shapes (scalar, sequence, mapping)
//! was used to encode the parameter list.

use proptest::prelude::*;
use tilefield_manifest::command::CommandInvocation;

fn command_name() -> impl Strategy<Value = String> {
    "[a-z]{2,10}"
}

fn param_value() -> impl Strategy<Value = i32> {
    -1000..1000i32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn scalar_param_round_trips(name in command_name(), value in param_value()) {
        let yaml = format!("{name}: {value}");
        let cmd: CommandInvocation = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(cmd.name, name);
        prop_assert_eq!(cmd.params, vec![value.to_string()]);
        prop_assert!(cmd.conditional.is_none());
    }

    #[test]
    fn sequence_params_round_trip(name in command_name(), values in prop::collection::vec(param_value(), 0..5)) {
        let inline = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
        let yaml = format!("{name}: [{inline}]");
        let cmd: CommandInvocation = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(cmd.name, name);
        let expected: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        prop_assert_eq!(cmd.params, expected);
        prop_assert!(cmd.conditional.is_none());
    }

    #[test]
    fn conditional_commands_nest_without_loss(name in command_name(), inner in command_name(), value in param_value()) {
        let yaml = format!("{name}:\n  Params: [{value}]\n  Cmd:\n    - {inner}: true\n");
        let cmd: CommandInvocation = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(cmd.name, name);
        prop_assert_eq!(cmd.params, vec![value.to_string()]);
        let nested = cmd.conditional.unwrap();
        prop_assert_eq!(nested.len(), 1);
        prop_assert_eq!(&nested[0].name, &inner);
    }
}
