//! File-format loaders, keyed by extension.

use crate::diagnostics::DiagnosticsRecorder;
use crate::error::{LoadError, LoadResult};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Parses the text of one file format into a value tree.
pub trait FormatLoader: Send + Sync {
    /// Format name shown in diagnostics (`json`, `yaml`).
    fn label(&self) -> &str;

    fn parse(&self, text: &str) -> anyhow::Result<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl FormatLoader for JsonLoader {
    fn label(&self) -> &str {
        "json"
    }

    fn parse(&self, text: &str) -> anyhow::Result<Value> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

impl FormatLoader for YamlLoader {
    fn label(&self) -> &str {
        "yaml"
    }

    fn parse(&self, text: &str) -> anyhow::Result<Value> {
        // An empty document parses to null; treat it as an empty mapping.
        let value: Value = serde_yaml::from_str(text)?;
        Ok(if value.is_null() {
            Value::Object(Default::default())
        } else {
            value
        })
    }
}

struct Registration {
    extensions: Vec<String>,
    loader: Arc<dyn FormatLoader>,
}

/// Ordered table of loaders. Lookup and path discovery follow registration
/// order.
#[derive(Default)]
pub struct LoaderRegistry {
    entries: Vec<Registration>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `json`, then `yaml`/`yml`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonLoader), &["json"]);
        registry.register(Arc::new(YamlLoader), &["yaml", "yml"]);
        registry
    }

    /// Register `loader` for `extensions`. An extension already claimed by an
    /// earlier loader moves to this one.
    pub fn register(&mut self, loader: Arc<dyn FormatLoader>, extensions: &[&str]) {
        let extensions: Vec<String> = extensions.iter().map(|e| normalize(e)).collect();
        for entry in &mut self.entries {
            entry.extensions.retain(|e| !extensions.contains(e));
        }
        self.entries.retain(|entry| !entry.extensions.is_empty());
        self.entries.push(Registration { extensions, loader });
    }

    /// Every registered extension, in registration order.
    pub fn extensions(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.extensions.iter().map(String::as_str))
            .collect()
    }

    pub fn loader_for(&self, path: &Path) -> Option<&dyn FormatLoader> {
        let ext = extension_of(path)?;
        self.entries
            .iter()
            .find(|entry| entry.extensions.contains(&ext))
            .map(|entry| entry.loader.as_ref())
    }

    /// Read and parse `path`, recording every loader considered.
    ///
    /// Loaders are considered in registration order until one claims the
    /// extension. Later entries are not considered and not recorded.
    pub fn load_file(&self, path: &Path, recorder: &mut DiagnosticsRecorder) -> LoadResult<Value> {
        let ext = extension_of(path).unwrap_or_default();
        let mut chosen = None;
        for entry in &self.entries {
            if entry.extensions.contains(&ext) {
                chosen = Some(entry.loader.as_ref());
                break;
            }
            let reason = format!("does not handle .{}", ext);
            recorder.record_loader_choice(entry.loader.label(), false, Some(&reason));
        }

        let Some(loader) = chosen else {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
                known: self.extensions().join(", "),
            });
        };

        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value = match loader.parse(&text) {
            Ok(value) => value,
            Err(e) => {
                let message = format!("{:#}", e);
                recorder.record_loader_choice(loader.label(), false, Some(&message));
                return Err(LoadError::Parse {
                    format: loader.label().to_string(),
                    path: path.to_path_buf(),
                    message,
                    diagnostics: recorder.snapshot(),
                });
            }
        };

        recorder.record_loader_choice(loader.label(), true, None);
        debug!(path = %path.display(), format = loader.label(), "config file parsed");
        Ok(value)
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(normalize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticEvent;
    use serde_json::json;
    use tempfile::TempDir;

    struct UpperLoader;

    impl FormatLoader for UpperLoader {
        fn label(&self) -> &str {
            "upper"
        }

        fn parse(&self, text: &str) -> anyhow::Result<Value> {
            Ok(json!({"text": text.to_uppercase()}))
        }
    }

    #[test]
    fn test_default_extensions_in_order() {
        let registry = LoaderRegistry::with_defaults();
        assert_eq!(registry.extensions(), vec!["json", "yaml", "yml"]);
        assert_eq!(
            registry.loader_for(Path::new("a.YML")).map(|l| l.label()),
            Some("yaml")
        );
        assert!(registry.loader_for(Path::new("a.toml")).is_none());
    }

    #[test]
    fn test_register_moves_extension() {
        let mut registry = LoaderRegistry::with_defaults();
        registry.register(Arc::new(UpperLoader), &[".json"]);
        assert_eq!(registry.extensions(), vec!["yaml", "yml", "json"]);
        assert_eq!(
            registry.loader_for(Path::new("x.json")).map(|l| l.label()),
            Some("upper")
        );
    }

    #[test]
    fn test_load_yaml_records_choices() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.yaml");
        std::fs::write(&path, "server:\n  port: 8080\n").unwrap();

        let mut recorder = DiagnosticsRecorder::new();
        let value = LoaderRegistry::with_defaults()
            .load_file(&path, &mut recorder)
            .unwrap();
        assert_eq!(value, json!({"server": {"port": 8080}}));

        let events = recorder.snapshot();
        assert_eq!(
            events,
            vec![
                DiagnosticEvent::Loader {
                    format: "json".into(),
                    used: false,
                    reason: Some("does not handle .yaml".into()),
                },
                DiagnosticEvent::Loader {
                    format: "yaml".into(),
                    used: true,
                    reason: None,
                },
            ]
        );
    }

    #[test]
    fn test_empty_yaml_is_empty_object() {
        assert_eq!(YamlLoader.parse("").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_error_names_format_and_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LoaderRegistry::with_defaults()
            .load_file(&path, &mut DiagnosticsRecorder::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::Parse { ref format, .. } if format == "json"));
        assert!(err.to_string().contains("bad.json"));
        assert!(matches!(
            err.diagnostics(),
            [DiagnosticEvent::Loader { format, used: false, reason: Some(_) }] if format == "json"
        ));
    }

    #[test]
    fn test_later_loaders_are_not_recorded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.json");
        std::fs::write(&path, "{}").unwrap();

        let mut recorder = DiagnosticsRecorder::new();
        LoaderRegistry::with_defaults().load_file(&path, &mut recorder).unwrap();
        assert_eq!(
            recorder.snapshot(),
            vec![DiagnosticEvent::Loader {
                format: "json".into(),
                used: true,
                reason: None,
            }]
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = LoaderRegistry::with_defaults()
            .load_file(Path::new("settings.toml"), &mut DiagnosticsRecorder::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat { .. }));
        assert!(err.to_string().contains("json, yaml, yml"));
    }
}
