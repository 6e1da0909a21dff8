//! CLI command definitions for strata
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod resolve;
pub mod sources;

use crate::config::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths, LoaderRegistry};
use crate::diagnostics::DiagnosticsRecorder;
use crate::error::LoadResult;
use crate::resolve::overrides_from_pairs;
use crate::schema::{SchemaNode, parse_schema};
use clap::{Args, Parser, Subcommand};
use resolve::ResolveArgs;
use std::path::{Path, PathBuf};

/// Environment variable naming the secrets base directory.
pub const SECRETS_DIR_ENV: &str = "STRATA_SECRETS_DIR";

/// Resolve configuration against a schema and inspect where values came from
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and print the (redacted) configuration
    Resolve(ResolveArgs),

    /// Print the winning source of every field
    Sources(InputArgs),
}

/// Inputs shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Schema document (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Explicit config file (skips discovery)
    #[arg(short, long, value_name = "FILE", env = CONFIG_PATH_ENV)]
    pub config: Option<PathBuf>,

    /// Directory to search for config.{json,yaml,yml}; repeatable
    #[arg(long = "search-dir", value_name = "DIR")]
    pub search_dirs: Vec<PathBuf>,

    /// Base directory for relative secret file references
    #[arg(long, value_name = "DIR", env = SECRETS_DIR_ENV)]
    pub secrets_dir: Option<PathBuf>,

    /// Override a value: path=value (value parsed as JSON, else string); repeatable
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub overrides: Vec<String>,
}

impl InputArgs {
    /// Config path settings implied by the flags.
    pub fn config_paths(&self) -> ConfigPaths {
        if let Some(ref path) = self.config {
            ConfigPaths::explicit(path)
        } else if !self.search_dirs.is_empty() {
            ConfigPaths::with_dirs(self.search_dirs.clone())
        } else {
            ConfigPaths::discover()
        }
    }

    /// Build a loader for these inputs over the process environment.
    pub fn loader(&self, registry: LoaderRegistry) -> LoadResult<ConfigLoader> {
        let schema = load_schema(&self.schema, &registry)?;
        let mut loader = ConfigLoader::new(schema)
            .paths(self.config_paths())
            .registry(registry);
        if let Some(ref dir) = self.secrets_dir {
            loader = loader.secrets_dir(dir);
        }
        if !self.overrides.is_empty() {
            loader = loader.overrides(overrides_from_pairs(&self.overrides)?);
        }
        Ok(loader)
    }
}

/// Read a schema document with any registered loader.
pub fn load_schema(path: &Path, registry: &LoaderRegistry) -> LoadResult<SchemaNode> {
    // Schema loading is not part of a resolution trace.
    let doc = registry.load_file(path, &mut DiagnosticsRecorder::new())?;
    parse_schema(&doc)
}
