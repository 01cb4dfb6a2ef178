//! Load-time error taxonomy for the declarative description.
//!
//! Every variant here is fatal at load time -- there is no partial manifest.
//! Command-level failures that occur later, during tick resolution, belong
//! to the engine crate's error type instead.

/// Errors produced while parsing or validating a declarative description.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The YAML document could not be parsed at all.
    #[error("malformed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document parsed as YAML but violates the description's shape
    /// (wrong node kind, missing required shape for a command, etc).
    #[error("bad description: {0}")]
    BadDescription(String),

    /// An object kind name was referenced that was never declared under
    /// `Objects`.
    #[error("unknown object kind '{0}'")]
    UnknownKind(String),

    /// Two objects declared the same `Name`.
    #[error("duplicate object kind '{0}'")]
    DuplicateKind(String),

    /// Two objects declared the same `MapCharacter`.
    #[error("duplicate map character '{0}' (used by '{1}' and '{2}')")]
    DuplicateMapChar(char, String, String),
}
