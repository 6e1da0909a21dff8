//! The result of a resolution pass.
//!
//! [`ResolvedConfig`] keeps the value tree as plain data and carries the
//! source map and diagnostics alongside it rather than inside it, so
//! `value()` can be handed to anything that expects an ordinary JSON object.

use crate::diagnostics::DiagnosticEvent;
use crate::path::FieldPath;
use crate::redact::{debug_tree, redact};
use crate::schema::SchemaNode;
use crate::source::{SourceMap, SourceTag};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Options for [`ResolvedConfig::to_debug_object`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugOptions {
    /// Embed the diagnostics trace. Off by default.
    pub include_diagnostics: bool,
}

/// Source-annotated, redacted view of a resolved config.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugObject {
    /// Leaves wrapped as `{ "value": .., "source": .. }`.
    pub config: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<DiagnosticEvent>>,
}

/// Validated configuration plus where each value came from.
#[derive(Clone)]
pub struct ResolvedConfig {
    value: Value,
    sources: SourceMap,
    diagnostics: Vec<DiagnosticEvent>,
    schema: Arc<SchemaNode>,
}

impl ResolvedConfig {
    pub(crate) fn new(
        value: Value,
        sources: SourceMap,
        diagnostics: Vec<DiagnosticEvent>,
        schema: Arc<SchemaNode>,
    ) -> Self {
        Self {
            value,
            sources,
            diagnostics,
            schema,
        }
    }

    /// The resolved value tree. Sensitive values are present in clear here.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        FieldPath::parse(path).lookup(&self.value)
    }

    /// Dotted path to winning source, for every field and literal leaf.
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn source(&self, path: &str) -> Option<&SourceTag> {
        self.sources.get(path)
    }

    /// Copy of the diagnostics trace in recording order.
    pub fn diagnostics(&self) -> Vec<DiagnosticEvent> {
        self.diagnostics.clone()
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// The value tree with sensitive leaves replaced by the redaction marker.
    pub fn redacted(&self) -> Value {
        redact(&self.schema, &self.value)
    }

    pub fn to_debug_object(&self, options: DebugOptions) -> DebugObject {
        DebugObject {
            config: debug_tree(&self.schema, &self.value, &self.sources),
            diagnostics: options.include_diagnostics.then(|| self.diagnostics()),
        }
    }

    /// Deserialize the resolved tree into a typed config struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string_pretty(&self.redacted()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("value", &self.redacted())
            .field("sources", &self.sources)
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

/// Source map of `candidate` if it is a [`ResolvedConfig`].
pub fn get_sources(candidate: &dyn Any) -> Option<&SourceMap> {
    candidate
        .downcast_ref::<ResolvedConfig>()
        .map(ResolvedConfig::sources)
}

/// Diagnostics snapshot of `candidate` if it is a [`ResolvedConfig`].
pub fn get_diagnostics(candidate: &dyn Any) -> Option<Vec<DiagnosticEvent>> {
    candidate
        .downcast_ref::<ResolvedConfig>()
        .map(ResolvedConfig::diagnostics)
}
