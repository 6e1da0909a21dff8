//! Configuration loader: materializes candidate inputs, then resolves.
//!
//! Loading happens in this order:
//! 1. Select the config file path (explicit, or first existing candidate)
//! 2. Parse it with the registered loader for its extension
//! 3. Snapshot the environment (unless an explicit map was given)
//! 4. Resolve the schema against overrides, env, secrets, file, initial values

use super::registry::LoaderRegistry;
use crate::diagnostics::DiagnosticsRecorder;
use crate::error::LoadResult;
use crate::resolve::{CandidateBundle, EnvMap, resolve_with, snapshot_env};
use crate::resolved::ResolvedConfig;
use crate::schema::SchemaNode;
use crate::secrets::{FsSecretReader, SecretReader, default_secrets_dir};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STRATA_CONFIG_PATH";

/// Where to look for the config file.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Explicit file path; wins over discovery when set.
    pub explicit: Option<PathBuf>,
    /// Directories searched in order.
    pub search_dirs: Vec<PathBuf>,
    /// File stems tried in each directory (`config` → `config.json`, ...).
    pub base_names: Vec<String>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Explicit path from `STRATA_CONFIG_PATH`, then `./config/`, `./`, and
    /// the user config directory.
    pub fn discover() -> Self {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);

        let mut search_dirs = vec![PathBuf::from("config"), PathBuf::from(".")];
        if let Some(dir) = dirs::config_dir() {
            search_dirs.push(dir.join("strata"));
        }

        Self {
            explicit,
            search_dirs,
            base_names: vec!["config".to_string()],
        }
    }

    /// Search only `dirs`; no explicit path.
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            explicit: None,
            search_dirs,
            base_names: vec!["config".to_string()],
        }
    }

    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            search_dirs: Vec::new(),
            base_names: vec!["config".to_string()],
        }
    }

    /// No config file at all.
    pub fn none() -> Self {
        Self {
            explicit: None,
            search_dirs: Vec::new(),
            base_names: Vec::new(),
        }
    }

    /// Every path discovery would try, in order.
    pub fn candidates(&self, registry: &LoaderRegistry) -> Vec<PathBuf> {
        let mut out = Vec::new();
        for dir in &self.search_dirs {
            for base in &self.base_names {
                for ext in registry.extensions() {
                    out.push(dir.join(format!("{}.{}", base, ext)));
                }
            }
        }
        out
    }

    /// Pick the config file, recording the choice and every candidate.
    pub fn select(
        &self,
        registry: &LoaderRegistry,
        recorder: &mut DiagnosticsRecorder,
    ) -> Option<PathBuf> {
        if let Some(ref path) = self.explicit {
            let shown = path.display().to_string();
            recorder.record_config_path_choice(Some(&shown), std::slice::from_ref(&shown), "explicit");
            return Some(path.clone());
        }

        let candidates = self.candidates(registry);
        let listed: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        match candidates.iter().find(|p| p.is_file()) {
            Some(found) => {
                let shown = found.display().to_string();
                recorder.record_config_path_choice(Some(&shown), &listed, "first-existing");
                Some(found.clone())
            }
            None => {
                recorder.record_config_path_choice(None, &listed, "no-candidate");
                None
            }
        }
    }
}

/// Builder that gathers inputs and runs one resolution pass per `load()`.
#[derive(Clone)]
pub struct ConfigLoader {
    schema: Arc<SchemaNode>,
    paths: ConfigPaths,
    registry: Arc<LoaderRegistry>,
    env: Option<EnvMap>,
    secrets_dir: Option<PathBuf>,
    secret_reader: Arc<dyn SecretReader>,
    overrides: Option<Value>,
    initial_values: Option<Value>,
}

impl ConfigLoader {
    pub fn new(schema: SchemaNode) -> Self {
        Self::with_schema(Arc::new(schema))
    }

    pub fn with_schema(schema: Arc<SchemaNode>) -> Self {
        Self {
            schema,
            paths: ConfigPaths::discover(),
            registry: Arc::new(LoaderRegistry::with_defaults()),
            env: None,
            secrets_dir: None,
            secret_reader: Arc::new(FsSecretReader),
            overrides: None,
            initial_values: None,
        }
    }

    pub fn paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Use `env` instead of the process environment.
    pub fn env(mut self, env: EnvMap) -> Self {
        self.env = Some(env);
        self
    }

    pub fn secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = Some(dir.into());
        self
    }

    pub fn secret_reader(mut self, reader: Arc<dyn SecretReader>) -> Self {
        self.secret_reader = reader;
        self
    }

    pub fn overrides(mut self, overrides: Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn initial_values(mut self, values: Value) -> Self {
        self.initial_values = Some(values);
        self
    }

    /// Materialize inputs and resolve.
    pub fn load(&self) -> LoadResult<ResolvedConfig> {
        let mut recorder = DiagnosticsRecorder::new();

        let mut bundle = CandidateBundle::new();
        if let Some(path) = self.paths.select(&self.registry, &mut recorder) {
            let values = self.registry.load_file(&path, &mut recorder)?;
            info!(path = %path.display(), "loaded config file");
            bundle = bundle.with_file_values(values, file_label(&path));
        }

        bundle.env = Some(self.env.clone().unwrap_or_else(snapshot_env));
        bundle.secrets_base_path = self.secrets_dir.clone().or_else(default_secrets_dir);
        if bundle.secrets_base_path.is_none() {
            warn!("no secrets directory available");
            recorder.record_note(
                "no secrets directory; relative secret references resolve against the working directory",
                None,
            );
        }
        bundle.overrides = self.overrides.clone();
        bundle.initial_values = self.initial_values.clone();

        Ok(resolve_with(
            Arc::clone(&self.schema),
            &bundle,
            self.secret_reader.as_ref(),
            recorder,
        )?)
    }
}

fn file_label(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticEvent;
    use crate::schema::FieldSpec;
    use crate::source::SourceTag;
    use serde_json::json;
    use tempfile::TempDir;

    fn schema() -> SchemaNode {
        SchemaNode::object([
            ("port", SchemaNode::field(FieldSpec::port().env("PORT").default_value(3000))),
            ("name", FieldSpec::string().default_value("app").into()),
        ])
    }

    #[test]
    fn test_candidates_follow_registry_order() {
        let paths = ConfigPaths::with_dirs(vec![PathBuf::from("a"), PathBuf::from("b")]);
        let candidates = paths.candidates(&LoaderRegistry::with_defaults());
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("a/config.json"),
                PathBuf::from("a/config.yaml"),
                PathBuf::from("a/config.yml"),
                PathBuf::from("b/config.json"),
                PathBuf::from("b/config.yaml"),
                PathBuf::from("b/config.yml"),
            ]
        );
    }

    #[test]
    fn test_select_first_existing() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        std::fs::create_dir_all(&first).unwrap();
        std::fs::create_dir_all(&second).unwrap();
        std::fs::write(second.join("config.yml"), "port: 1").unwrap();

        let mut recorder = DiagnosticsRecorder::new();
        let picked = ConfigPaths::with_dirs(vec![first, second.clone()])
            .select(&LoaderRegistry::with_defaults(), &mut recorder);
        assert_eq!(picked, Some(second.join("config.yml")));

        let events = recorder.snapshot();
        let DiagnosticEvent::ConfigPath { candidates, reason, .. } = &events[0] else {
            panic!("expected config path event");
        };
        assert_eq!(candidates.len(), 6);
        assert_eq!(reason, "first-existing");
    }

    #[test]
    fn test_select_none() {
        let temp = TempDir::new().unwrap();
        let mut recorder = DiagnosticsRecorder::new();
        let picked = ConfigPaths::with_dirs(vec![temp.path().to_path_buf()])
            .select(&LoaderRegistry::with_defaults(), &mut recorder);
        assert!(picked.is_none());
        assert!(matches!(
            &recorder.snapshot()[0],
            DiagnosticEvent::ConfigPath { picked: None, reason, .. } if reason == "no-candidate"
        ));
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let resolved = ConfigLoader::new(schema())
            .paths(ConfigPaths::with_dirs(vec![temp.path().to_path_buf()]))
            .env(EnvMap::new())
            .secrets_dir(temp.path())
            .load()
            .unwrap();

        assert_eq!(resolved.value(), &json!({"port": 3000, "name": "app"}));
        assert_eq!(resolved.source("port"), Some(&SourceTag::Default));
    }

    #[test]
    fn test_file_then_env_then_override() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.yaml"), "port: 4000\nname: from-file\n").unwrap();

        let loader = ConfigLoader::new(schema())
            .paths(ConfigPaths::with_dirs(vec![temp.path().to_path_buf()]))
            .secrets_dir(temp.path());

        let from_file = loader.clone().env(EnvMap::new()).load().unwrap();
        assert_eq!(from_file.value()["port"], json!(4000));
        assert_eq!(
            from_file.source("port"),
            Some(&SourceTag::File(Some("config.yaml".into())))
        );

        let env = EnvMap::from([("PORT".to_string(), Some("5000".to_string()))]);
        let from_env = loader.clone().env(env.clone()).load().unwrap();
        assert_eq!(from_env.value()["port"], json!(5000));
        assert_eq!(from_env.value()["name"], json!("from-file"));

        let overridden = loader.env(env).overrides(json!({"port": 6000})).load().unwrap();
        assert_eq!(overridden.value()["port"], json!(6000));
        assert_eq!(overridden.source("port"), Some(&SourceTag::Override));
    }

    #[test]
    fn test_load_diagnostics_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("app.json");
        std::fs::write(&path, r#"{"port": 4000}"#).unwrap();

        let resolved = ConfigLoader::new(schema())
            .paths(ConfigPaths::explicit(&path))
            .env(EnvMap::new())
            .secrets_dir(temp.path())
            .load()
            .unwrap();

        let kinds: Vec<&str> = resolved
            .diagnostics()
            .iter()
            .map(|e| match e {
                DiagnosticEvent::ConfigPath { .. } => "path",
                DiagnosticEvent::Loader { used: true, .. } => "loader",
                DiagnosticEvent::Loader { used: false, .. } => "rejected",
                DiagnosticEvent::SourceDecision { .. } => "source",
                DiagnosticEvent::Note { .. } => "note",
            })
            .collect();
        assert_eq!(kinds, vec!["path", "loader", "source", "source"]);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = ConfigLoader::new(schema())
            .paths(ConfigPaths::explicit(temp.path().join("nope.yaml")))
            .env(EnvMap::new())
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }
}
