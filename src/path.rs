//! Dotted field paths and nested value access.

use serde_json::{Map, Value};
use std::fmt;

/// Ordered keys from the schema root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path. Empty segments are dropped.
    pub fn parse(dotted: &str) -> Self {
        Self(
            dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    /// Value at this path inside `tree`, treating `null` as absent.
    pub fn lookup<'v>(&self, tree: &'v Value) -> Option<&'v Value> {
        let mut current = tree;
        for segment in &self.0 {
            current = current.as_object()?.get(segment)?;
        }
        if current.is_null() { None } else { Some(current) }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Set `new_val` at `path` inside `tree`, creating intermediate objects and
/// replacing any non-object value standing in the way.
pub fn set_nested(tree: &mut Value, path: &FieldPath, new_val: Value) {
    let Some((leaf, parents)) = path.segments().split_last() else {
        *tree = new_val;
        return;
    };

    let mut current = tree;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert(leaf.clone(), new_val);
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}
