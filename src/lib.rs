//! Strata Config Library
//!
//! Resolves a declared schema into validated values by merging overrides,
//! environment variables, secret files, a config file, initial values, and
//! defaults under a fixed priority order. Every resolved leaf carries its
//! winning source, every decision is traced, and values marked sensitive
//! never appear in errors, logs, or debug output.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use strata_config::resolve::{CandidateBundle, resolve};
//! use strata_config::schema::{FieldSpec, SchemaNode};
//! use strata_config::secrets::MemorySecretReader;
//!
//! let schema = SchemaNode::object([
//!     ("port", SchemaNode::field(FieldSpec::port().env("PORT").default_value(3000))),
//! ]);
//! let bundle = CandidateBundle::new().with_env_vars([("PORT", "8080")]);
//! let resolved = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap();
//! assert_eq!(resolved.value(), &json!({"port": 8080}));
//! assert_eq!(resolved.source("port").map(|s| s.to_string()).as_deref(), Some("env:PORT"));
//! ```

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod path;
pub mod redact;
pub mod resolve;
pub mod resolved;
pub mod schema;
pub mod secrets;
pub mod source;

pub use config::{ConfigLoader, ConfigPaths, LoaderRegistry};
pub use diagnostics::{DiagnosticEvent, DiagnosticsRecorder};
pub use error::{ConfigError, ErrorKind, LoadError};
pub use resolve::{CandidateBundle, resolve};
pub use resolved::{DebugOptions, ResolvedConfig, get_diagnostics, get_sources};
pub use schema::{FieldSpec, SchemaNode};
pub use source::{SourceMap, SourceTag};
