//! strata
//!
//! Resolves a configuration schema against overrides, environment
//! variables, secret files, and a config file, and shows where every value
//! came from.

use anyhow::Result;
use clap::Parser;
use strata_config::cli::{Cli, Command, sources};
use strata_config::config::LoaderRegistry;
use strata_config::logging::{self, LogTarget};
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    match cli.command {
        Command::Resolve(args) => {
            let resolved = args.input.loader(LoaderRegistry::with_defaults())?.load()?;
            debug!(fields = resolved.sources().len(), "resolved");
            println!("{}", args.render(&resolved)?);
        }
        Command::Sources(input) => {
            let resolved = input.loader(LoaderRegistry::with_defaults())?.load()?;
            print!("{}", sources::render(&resolved));
        }
    }

    Ok(())
}
