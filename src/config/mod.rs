//! Config file discovery and loading.
//!
//! Turns a schema plus the outside world (a config file, the process
//! environment, a secrets directory) into a single resolution pass.
//!
//! ## File discovery
//! - `STRATA_CONFIG_PATH` - Explicit config file (wins over the search)
//! - `./config/config.{json,yaml,yml}`
//! - `./config.{json,yaml,yml}`
//! - `<user config dir>/strata/config.{json,yaml,yml}`
//!
//! Extensions are tried in loader registration order.

mod loader;
mod registry;

pub use loader::{CONFIG_PATH_ENV, ConfigLoader, ConfigPaths};
pub use registry::{FormatLoader, JsonLoader, LoaderRegistry, YamlLoader};
