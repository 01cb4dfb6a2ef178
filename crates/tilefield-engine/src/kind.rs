//! Object Factory (spec §4.B): the kind registry objects are instantiated
//! from.
//!
//! Z-index/layer assignment is an Open Question the distilled spec leaves
//! unresolved (`original_source/` only shows a test-only signature that
//! accepts an explicit `zIdx`, which is not the production contract). This
//! registry assigns each kind's layer as its declaration order in the
//! description's `Objects` list -- the first declared kind sits on layer 0,
//! the second on layer 1, and so on -- which is deterministic and requires no
//! extra schema field.

use std::collections::HashMap;

use tilefield_manifest::Description;

use crate::error::EngineError;
use crate::object::{Object, Orientation, PlayerId};

/// A registered object kind.
#[derive(Debug, Clone)]
pub struct KindInfo {
    pub name: String,
    pub map_character: char,
    pub layer: u32,
    pub parameter_defaults: Vec<(String, i32)>,
}

/// Kind registry compiled once from a [`Description`] and shared read-only
/// by every [`crate::process::GameProcess`] running that description.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    kinds: Vec<KindInfo>,
    by_name: HashMap<String, usize>,
    by_char: HashMap<char, usize>,
}

impl KindRegistry {
    /// Compile the registry from a validated description.
    ///
    /// `Description::validate` already rejects duplicate names/characters at
    /// load time, but the factory's own contract ("refuses to re-register a
    /// kind or map character") is re-checked here too -- this registry is a
    /// boundary in its own right, not merely a cache of the manifest's.
    pub fn compile(description: &Description) -> Result<Self, EngineError> {
        let mut kinds = Vec::with_capacity(description.objects.len());
        let mut by_name = HashMap::new();
        let mut by_char = HashMap::new();

        for (layer, object) in description.objects.iter().enumerate() {
            if by_name.contains_key(&object.name) {
                return Err(EngineError::DuplicateKind(object.name.clone()));
            }
            if by_char.contains_key(&object.map_character) {
                return Err(EngineError::DuplicateMapChar(object.map_character));
            }
            let index = kinds.len();
            by_name.insert(object.name.clone(), index);
            by_char.insert(object.map_character, index);
            kinds.push(KindInfo {
                name: object.name.clone(),
                map_character: object.map_character,
                layer: layer as u32,
                parameter_defaults: object
                    .parameters
                    .iter()
                    .map(|p| (p.name.clone(), p.initial_value))
                    .collect(),
            });
        }

        Ok(Self {
            kinds,
            by_name,
            by_char,
        })
    }

    pub fn kind(&self, name: &str) -> Option<&KindInfo> {
        self.by_name.get(name).map(|&i| &self.kinds[i])
    }

    pub fn kind_by_char(&self, c: char) -> Option<&KindInfo> {
        self.by_char.get(&c).map(|&i| &self.kinds[i])
    }

    pub fn layer_of(&self, name: &str) -> Option<u32> {
        self.kind(name).map(|k| k.layer)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &KindInfo> {
        self.kinds.iter()
    }

    /// Build a fresh [`Object`] of `kind_name`, seeded with that kind's
    /// parameter defaults. Does not place the object into any grid.
    pub fn instantiate(
        &self,
        kind_name: &str,
        player_id: PlayerId,
        location: (i32, i32),
        orientation: Orientation,
    ) -> Result<Object, EngineError> {
        let info = self
            .kind(kind_name)
            .ok_or_else(|| EngineError::UnknownKind(kind_name.to_owned()))?;
        let parameters = info.parameter_defaults.iter().cloned().collect();
        Ok(Object::new(
            info.name.clone(),
            player_id,
            location,
            orientation,
            info.layer,
            parameters,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilefield_manifest::Description;

    fn desc(yaml: &str) -> Description {
        Description::from_yaml(yaml).unwrap()
    }

    #[test]
    fn assigns_layers_by_declaration_order() {
        let d = desc(
            r#"
Version: "0.1"
Environment: { Levels: ["HM"] }
Objects:
  - Name: harvester
    MapCharacter: H
  - Name: minerals
    MapCharacter: M
"#,
        );
        let registry = KindRegistry::compile(&d).unwrap();
        assert_eq!(registry.layer_of("harvester"), Some(0));
        assert_eq!(registry.layer_of("minerals"), Some(1));
    }

    #[test]
    fn instantiate_seeds_parameter_defaults() {
        let d = desc(
            r#"
Version: "0.1"
Environment: { Levels: ["M"] }
Objects:
  - Name: minerals
    MapCharacter: M
    Parameters: [{Name: value, InitialValue: 10}]
"#,
        );
        let registry = KindRegistry::compile(&d).unwrap();
        let obj = registry
            .instantiate("minerals", 0, (0, 0), Orientation::North)
            .unwrap();
        assert_eq!(obj.parameter("value"), 10);
        assert_eq!(obj.layer, 0);
    }

    #[test]
    fn instantiate_unknown_kind_errors() {
        let d = desc(
            r#"
Version: "0.1"
Environment: { Levels: ["M"] }
Objects:
  - {Name: minerals, MapCharacter: M}
"#,
        );
        let registry = KindRegistry::compile(&d).unwrap();
        let err = registry
            .instantiate("ghost", 0, (0, 0), Orientation::North)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownKind(k) if k == "ghost"));
    }
}
