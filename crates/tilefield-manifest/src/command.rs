//! Command invocations inside a behaviour's `Cmd` sequence.
//!
//! A command invocation is YAML-shaped as a single-key mapping whose value is
//! one of three things: a bare scalar (`remove: true`), a sequence
//! (`reward: [1]`), or a mapping carrying `Params` and a nested `Cmd` list for
//! a conditional command (`eq: {Params: [value, 0], Cmd: [...]}`). `serde`'s
//! derive macro cannot express "one of three shapes keyed by an arbitrary
//! command name" directly, so [`CommandInvocation`] implements [`Deserialize`]
//! by hand over a [`serde_yaml::Value`], the same way the original C++ loader
//! walks `YAML::Node`s one key at a time instead of binding a schema.

use serde::de::{self, Deserialize, Deserializer};
use serde_yaml::Value;

use crate::ManifestError;

/// One command invocation: a primitive command name, its parameter list, and
/// -- for predicate commands (`eq`/`gt`/`lt`) -- the ordered sub-commands to
/// run when the predicate evaluates true.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandInvocation {
    /// Primitive command name (`mov`, `reward`, `eq`, ...), looked up in the
    /// command library at resolution time.
    pub name: String,
    /// Parameters: a bare scalar becomes a one-element list, a YAML sequence
    /// is taken as-is, and a conditional's `Params` field is parsed the same
    /// way.
    pub params: Vec<String>,
    /// Present only for conditional commands: the ordered command list to
    /// run when `name`'s predicate evaluates true.
    pub conditional: Option<Vec<CommandInvocation>>,
}

impl<'de> Deserialize<'de> for CommandInvocation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let mapping = value.as_mapping().ok_or_else(|| {
            de::Error::custom("command invocation must be a single-key mapping")
        })?;
        if mapping.len() != 1 {
            return Err(de::Error::custom(format!(
                "command invocation mapping must have exactly one key, found {}",
                mapping.len()
            )));
        }
        let (key, val) = mapping.iter().next().expect("len checked above");
        let name = key
            .as_str()
            .ok_or_else(|| de::Error::custom("command name must be a string"))?
            .to_owned();

        match val {
            Value::Mapping(inner) => {
                let params = inner
                    .get(&Value::from("Params"))
                    .map(value_to_string_list)
                    .transpose()
                    .map_err(de::Error::custom)?
                    .unwrap_or_default();
                let cmd_node = inner.get(&Value::from("Cmd")).ok_or_else(|| {
                    de::Error::custom(format!(
                        "conditional command '{name}' is missing its 'Cmd' list"
                    ))
                })?;
                let conditional: Vec<CommandInvocation> =
                    serde_yaml::from_value(cmd_node.clone()).map_err(de::Error::custom)?;
                Ok(CommandInvocation {
                    name,
                    params,
                    conditional: Some(conditional),
                })
            }
            other => {
                let params = value_to_string_list(other).map_err(de::Error::custom)?;
                Ok(CommandInvocation {
                    name,
                    params,
                    conditional: None,
                })
            }
        }
    }
}

/// Coerce a scalar, sequence, or `Null` YAML node into a flat string list.
/// Mirrors the original loader's `singleOrListNodeToList` helper, used both
/// for bare command parameters and for `Src`/`Dst` `Type` fields.
pub(crate) fn value_to_string_list(value: &Value) -> Result<Vec<String>, ManifestError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Bool(b) => Ok(vec![b.to_string()]),
        Value::Number(n) => Ok(vec![n.to_string()]),
        Value::Sequence(seq) => seq.iter().map(scalar_to_string).collect(),
        Value::Mapping(_) => Err(ManifestError::BadDescription(
            "expected a scalar or sequence, found a mapping".to_owned(),
        )),
    }
}

fn scalar_to_string(value: &Value) -> Result<String, ManifestError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ManifestError::BadDescription(format!(
            "expected a scalar list element, found {other:?}"
        ))),
    }
}

/// Parse a `Type` field (single kind name or a sequence of kind names).
pub(crate) fn single_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_string_list(&value).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_command() {
        let yaml = "remove: true";
        let cmd: CommandInvocation = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cmd.name, "remove");
        assert_eq!(cmd.params, vec!["true".to_owned()]);
        assert!(cmd.conditional.is_none());
    }

    #[test]
    fn parses_sequence_command() {
        let yaml = "reward: [1]";
        let cmd: CommandInvocation = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cmd.name, "reward");
        assert_eq!(cmd.params, vec!["1".to_owned()]);
    }

    #[test]
    fn parses_conditional_command() {
        let yaml = "eq:\n  Params: [value, 0]\n  Cmd:\n    - remove: true\n";
        let cmd: CommandInvocation = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cmd.name, "eq");
        assert_eq!(cmd.params, vec!["value".to_owned(), "0".to_owned()]);
        let nested = cmd.conditional.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].name, "remove");
    }

    #[test]
    fn rejects_multi_key_mapping() {
        let yaml = "remove: true\nmov: true\n";
        let result: Result<CommandInvocation, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }
}
