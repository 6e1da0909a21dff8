//! Source tags: where a resolved value came from.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies which candidate source produced a field's value.
///
/// Sources are declared in priority order, highest first. [`SourceTag::Literal`]
/// never competes with the others.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceTag {
    /// Explicit runtime override.
    Override,
    /// Environment variable, by name.
    Env(String),
    /// Secret file, by resolved path.
    SecretFile(String),
    /// File-derived values, optionally labelled with the file they came from.
    File(Option<String>),
    /// Caller-supplied initial values.
    Initial,
    /// Schema-declared default.
    Default,
    /// Schema-authored literal.
    Literal,
}

impl SourceTag {
    /// Priority rank, 0 being the highest. Literals rank outside the chain.
    pub fn rank(&self) -> u8 {
        match self {
            SourceTag::Override => 0,
            SourceTag::Env(_) => 1,
            SourceTag::SecretFile(_) => 2,
            SourceTag::File(_) => 3,
            SourceTag::Initial => 4,
            SourceTag::Default => 5,
            SourceTag::Literal => u8::MAX,
        }
    }

    /// Short kind name without the qualifier (`env`, `secretFile`, ...).
    pub fn kind(&self) -> &'static str {
        match self {
            SourceTag::Override => "override",
            SourceTag::Env(_) => "env",
            SourceTag::SecretFile(_) => "secretFile",
            SourceTag::File(_) => "file",
            SourceTag::Initial => "initial",
            SourceTag::Default => "default",
            SourceTag::Literal => "literal",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Env(name) => write!(f, "env:{}", name),
            SourceTag::SecretFile(path) => write!(f, "secretFile:{}", path),
            SourceTag::File(Some(label)) => write!(f, "file:{}", label),
            other => f.write_str(other.kind()),
        }
    }
}

impl Serialize for SourceTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Flat map of dotted field path to the source that won it.
pub type SourceMap = BTreeMap<String, SourceTag>;
