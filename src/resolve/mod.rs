//! Value resolution.
//!
//! For every field leaf the walker consults, in fixed priority order:
//!
//! 1. **override** - explicit runtime overrides
//! 2. **env** - the field's declared environment variable
//! 3. **secretFile** - the field's secret file, resolved against the secrets base path
//! 4. **file** - values parsed from the config file
//! 5. **initial** - caller-supplied seed values
//! 6. **default** - the schema-declared default
//!
//! The first source holding a defined value wins; later sources are not
//! consulted. Literal leaves never compete and always report `literal`.
//! A secret file that exists but cannot be read fails the call rather than
//! yielding to a lower source.
//!
//! Resolution is all-or-nothing. Every field's candidate is picked before
//! any validator runs, so a missing value fails the call without a single
//! validator having been invoked; the first validation failure then aborts
//! the rest.

mod candidates;

pub use candidates::{CandidateBundle, EnvMap, overrides_from_pairs, snapshot_env};

use crate::diagnostics::DiagnosticsRecorder;
use crate::error::{ConfigError, ConfigResult};
use crate::path::FieldPath;
use crate::resolved::ResolvedConfig;
use crate::schema::{FieldSpec, SchemaNode};
use crate::secrets::{SecretReader, resolve_secret_path};
use crate::source::{SourceMap, SourceTag};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Resolve `schema` against `bundle` with a fresh diagnostics recorder.
pub fn resolve(
    schema: Arc<SchemaNode>,
    bundle: &CandidateBundle,
    secrets: &dyn SecretReader,
) -> ConfigResult<ResolvedConfig> {
    resolve_with(schema, bundle, secrets, DiagnosticsRecorder::new())
}

/// Resolve with a recorder that may already hold events from input
/// loading (path selection, loader choice).
///
/// On failure the error carries every event recorded up to that point.
pub fn resolve_with(
    schema: Arc<SchemaNode>,
    bundle: &CandidateBundle,
    secrets: &dyn SecretReader,
    mut recorder: DiagnosticsRecorder,
) -> ConfigResult<ResolvedConfig> {
    let walker = Walker { bundle, secrets };
    match walker.run(&schema, &mut recorder) {
        Ok(resolution) => {
            info!(fields = resolution.sources.len(), "configuration resolved");
            Ok(ResolvedConfig::new(
                resolution.value,
                resolution.sources,
                recorder.into_events(),
                schema,
            ))
        }
        Err(err) => {
            debug!(path = %err.path, kind = ?err.kind, "resolution failed");
            Err(err.with_diagnostics(recorder.snapshot()))
        }
    }
}

/// Output of a successful walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Value,
    pub sources: SourceMap,
}

/// A field's winning candidate, before validation.
struct Pick<'s> {
    path: String,
    spec: &'s FieldSpec,
    value: Value,
    source: SourceTag,
    tried: Vec<SourceTag>,
}

struct Walker<'a> {
    bundle: &'a CandidateBundle,
    secrets: &'a dyn SecretReader,
}

impl Walker<'_> {
    fn run(&self, schema: &SchemaNode, recorder: &mut DiagnosticsRecorder) -> ConfigResult<Resolution> {
        let mut picks = Vec::new();
        let mut sources = SourceMap::new();
        self.collect(schema, &FieldPath::root(), &mut picks, &mut sources)?;

        let mut validated = Vec::with_capacity(picks.len());
        for pick in picks {
            let value = pick.spec.validator().validate(&pick.value).map_err(|issues| {
                let issue = issues
                    .first()
                    .map(String::as_str)
                    .unwrap_or("rejected by validator");
                ConfigError::invalid_value(&pick.path, pick.spec.sensitive, issue, &pick.value)
            })?;
            recorder.record_source_decision(&pick.path, pick.source.clone(), pick.tried);
            sources.insert(pick.path, pick.source);
            validated.push(value);
        }

        let mut values = validated.into_iter();
        let value = assemble(schema, &mut values);
        Ok(Resolution { value, sources })
    }

    fn collect<'s>(
        &self,
        node: &'s SchemaNode,
        path: &FieldPath,
        picks: &mut Vec<Pick<'s>>,
        sources: &mut SourceMap,
    ) -> ConfigResult<()> {
        match node {
            SchemaNode::Object(children) => {
                for (key, child) in children {
                    self.collect(child, &path.child(key), picks, sources)?;
                }
            }
            SchemaNode::Literal(_) => {
                sources.insert(path.dotted(), SourceTag::Literal);
            }
            SchemaNode::Field(spec) => picks.push(self.pick(spec, path)?),
        }
        Ok(())
    }

    fn pick<'s>(&self, spec: &'s FieldSpec, path: &FieldPath) -> ConfigResult<Pick<'s>> {
        let dotted = path.dotted();
        let mut tried = Vec::new();
        match self.first_defined(spec, path, &mut tried)? {
            Some((value, source)) => Ok(Pick {
                path: dotted,
                spec,
                value,
                source,
                tried,
            }),
            None => {
                debug!(path = %dotted, tried = tried.len(), "no source produced a value");
                Err(ConfigError::missing_value(&dotted, spec.sensitive))
            }
        }
    }

    /// Walk the sources in priority order, recording each one attempted.
    ///
    /// Fails only when a declared secret file exists but cannot be read.
    fn first_defined(
        &self,
        spec: &FieldSpec,
        path: &FieldPath,
        tried: &mut Vec<SourceTag>,
    ) -> ConfigResult<Option<(Value, SourceTag)>> {
        let bundle = self.bundle;

        if let Some(overrides) = &bundle.overrides
            && let Some(hit) = attempt(tried, SourceTag::Override, path.lookup(overrides).cloned())
        {
            return Ok(Some(hit));
        }

        if let (Some(name), Some(env)) = (&spec.env, &bundle.env) {
            let value = env.get(name).cloned().flatten().map(Value::String);
            if let Some(hit) = attempt(tried, SourceTag::Env(name.clone()), value) {
                return Ok(Some(hit));
            }
        }

        if let Some(reference) = &spec.secret_file {
            let resolved = resolve_secret_path(reference, bundle.secrets_base_path.as_deref());
            let value = self
                .secrets
                .read(&resolved)
                .map_err(|e| ConfigError::unreadable_secret(&path.dotted(), spec.sensitive, &resolved, &e))?
                .map(Value::String);
            let tag = SourceTag::SecretFile(resolved.display().to_string());
            if let Some(hit) = attempt(tried, tag, value) {
                return Ok(Some(hit));
            }
        }

        if let Some(file_values) = &bundle.file_values {
            let tag = SourceTag::File(bundle.config_path_label.clone());
            if let Some(hit) = attempt(tried, tag, path.lookup(file_values).cloned()) {
                return Ok(Some(hit));
            }
        }

        if let Some(initial) = &bundle.initial_values
            && let Some(hit) = attempt(tried, SourceTag::Initial, path.lookup(initial).cloned())
        {
            return Ok(Some(hit));
        }

        let Some(default) = spec.default.clone().filter(|v| !v.is_null()) else {
            return Ok(None);
        };
        Ok(attempt(tried, SourceTag::Default, Some(default)))
    }
}

fn attempt(
    tried: &mut Vec<SourceTag>,
    tag: SourceTag,
    candidate: Option<Value>,
) -> Option<(Value, SourceTag)> {
    tried.push(tag.clone());
    candidate.map(|value| (value, tag))
}

/// Rebuild the value tree, taking validated field values in schema order.
fn assemble(node: &SchemaNode, values: &mut impl Iterator<Item = Value>) -> Value {
    match node {
        SchemaNode::Object(children) => {
            let mut out = Map::new();
            for (key, child) in children {
                let value = assemble(child, values);
                out.insert(key.clone(), value);
            }
            Value::Object(out)
        }
        SchemaNode::Literal(value) => value.clone(),
        SchemaNode::Field(_) => values.next().unwrap_or(Value::Null),
    }
}
