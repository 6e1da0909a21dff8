//! Per-call candidate inputs.

use crate::error::{LoadError, LoadResult};
use crate::path::{FieldPath, set_nested};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variables by name. `None` marks a name known to be unset.
pub type EnvMap = HashMap<String, Option<String>>;

/// Everything a resolution pass may draw values from.
///
/// Each map is a tree shaped like (a subset of) the schema. An absent map
/// is never consulted and never appears in a field's tried list.
#[derive(Debug, Clone, Default)]
pub struct CandidateBundle {
    pub overrides: Option<Value>,
    pub env: Option<EnvMap>,
    pub secrets_base_path: Option<PathBuf>,
    pub file_values: Option<Value>,
    pub initial_values: Option<Value>,
    /// Label of the file behind `file_values`, shown as `file:<label>`.
    pub config_path_label: Option<String>,
}

impl CandidateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    /// Environment from `(name, value)` pairs, all set.
    pub fn with_env_vars<K, V>(self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.with_env(
            vars.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }

    pub fn with_secrets_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_base_path = Some(path.into());
        self
    }

    pub fn with_file_values(mut self, values: Value, label: Option<String>) -> Self {
        self.file_values = Some(values);
        self.config_path_label = label;
        self
    }

    pub fn with_initial_values(mut self, values: Value) -> Self {
        self.initial_values = Some(values);
        self
    }
}

/// Snapshot of the process environment. Variables that are not valid
/// unicode are skipped.
pub fn snapshot_env() -> EnvMap {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, Some(v.into_string().ok()?))))
        .collect()
}

/// Build an override tree from `path=value` assignments.
///
/// Values that parse as JSON keep their JSON type (`port=8080` is a number);
/// anything else is taken as a plain string.
pub fn overrides_from_pairs<S: AsRef<str>>(pairs: &[S]) -> LoadResult<Value> {
    let mut tree = Value::Object(Map::new());
    for pair in pairs {
        let pair = pair.as_ref();
        let Some((path, raw)) = pair.split_once('=') else {
            return Err(LoadError::Override(pair.to_string()));
        };
        let path = FieldPath::parse(path.trim());
        if path.is_root() {
            return Err(LoadError::Override(pair.to_string()));
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        set_nested(&mut tree, &path, value);
    }
    Ok(tree)
}
