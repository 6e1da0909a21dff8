//! Resolve subcommand for strata CLI
//!
//! Prints the resolved configuration with sensitive values redacted, or the
//! source-annotated debug view.

use super::InputArgs;
use crate::resolved::{DebugOptions, ResolvedConfig};
use clap::Args;
use serde_json::Value;

/// Arguments for the resolve subcommand
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Print the debug view (each leaf as value + source)
    #[arg(long)]
    pub debug: bool,

    /// Include the diagnostics trace (implies --debug)
    #[arg(long)]
    pub diagnostics: bool,

    /// Output format: json (default) or yaml
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// Output format for resolved configs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: json, yaml",
                s
            )),
        }
    }
}

impl ResolveArgs {
    /// The tree to print. Never contains a sensitive value in clear.
    pub fn view(&self, resolved: &ResolvedConfig) -> anyhow::Result<Value> {
        if self.debug || self.diagnostics {
            let debug = resolved.to_debug_object(DebugOptions {
                include_diagnostics: self.diagnostics,
            });
            Ok(serde_json::to_value(debug)?)
        } else {
            Ok(resolved.redacted())
        }
    }

    pub fn render(&self, resolved: &ResolvedConfig) -> anyhow::Result<String> {
        let view = self.view(resolved)?;
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&view)?,
            OutputFormat::Yaml => serde_yaml::to_string(&view)?,
        })
    }
}
