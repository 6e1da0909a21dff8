//! Structured error types for resolution and loading.

use crate::diagnostics::DiagnosticEvent;
use crate::redact::REDACTED;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Error kinds for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// No source produced a defined value for a field.
    MissingValue,
    /// A value was found but the field's validator rejected it.
    InvalidValue,
    /// A field's secret file exists but could not be read.
    UnreadableSecret,
}

/// A field failed to resolve.
///
/// The message always names the dotted field path. Values of sensitive
/// fields are replaced by [`REDACTED`] before the message is built, so the
/// error can be logged or displayed as-is.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    pub kind: ErrorKind,
    pub path: String,
    pub sensitive: bool,
    pub message: String,
    /// Diagnostics recorded up to the point of failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<DiagnosticEvent>,
}

impl ConfigError {
    pub fn missing_value(path: &str, sensitive: bool) -> Self {
        let received = if sensitive { REDACTED } else { "undefined" };
        Self {
            kind: ErrorKind::MissingValue,
            path: path.to_string(),
            sensitive,
            message: format!(
                "Missing required config value at \"{}\" (received {})",
                path, received
            ),
            diagnostics: Vec::new(),
        }
    }

    pub fn invalid_value(path: &str, sensitive: bool, issue: &str, value: &Value) -> Self {
        let received = if sensitive {
            REDACTED.to_string()
        } else {
            value.to_string()
        };
        Self {
            kind: ErrorKind::InvalidValue,
            path: path.to_string(),
            sensitive,
            message: format!(
                "Invalid config value at \"{}\": {} (received {})",
                path, issue, received
            ),
            diagnostics: Vec::new(),
        }
    }

    /// The secret file behind `path` exists but could not be read. Only the
    /// file path and the I/O error are named; there is no value to show.
    pub fn unreadable_secret(
        path: &str,
        sensitive: bool,
        secret_path: &Path,
        error: &std::io::Error,
    ) -> Self {
        Self {
            kind: ErrorKind::UnreadableSecret,
            path: path.to_string(),
            sensitive,
            message: format!(
                "Unreadable secret file for config value at \"{}\": {}: {}",
                path,
                secret_path.display(),
                error
            ),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<DiagnosticEvent>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn is_missing(&self) -> bool {
        self.kind == ErrorKind::MissingValue
    }

    pub fn is_invalid(&self) -> bool {
        self.kind == ErrorKind::InvalidValue
    }
}

/// Errors raised while materializing inputs for a resolution pass.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    Parse {
        format: String,
        path: PathBuf,
        message: String,
        /// Loader choices recorded up to the failure.
        diagnostics: Vec<DiagnosticEvent>,
    },

    #[error("No loader registered for {path} (known extensions: {known})")]
    UnsupportedFormat { path: PathBuf, known: String },

    #[error("Invalid schema at \"{path}\": {message}")]
    Schema { path: String, message: String },

    #[error("Invalid override \"{0}\": expected path=value")]
    Override(String),

    #[error(transparent)]
    Resolve(#[from] ConfigError),
}

impl LoadError {
    pub fn schema(path: &str, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Diagnostics attached to the error, if it carries any.
    pub fn diagnostics(&self) -> &[DiagnosticEvent] {
        match self {
            LoadError::Parse { diagnostics, .. } => diagnostics.as_slice(),
            LoadError::Resolve(err) => err.diagnostics.as_slice(),
            _ => &[],
        }
    }
}

/// Result type for resolution.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for loading and orchestration.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
