//! Secret file access.
//!
//! Fields reference secret files by name. Relative references are joined to
//! the secrets base path; absolute references are used as-is.

use std::collections::HashMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reads the content of a secret file, already trimmed.
///
/// `Ok(None)` means the secret is absent. An empty string is a defined
/// value. A secret that exists but cannot be read is an error, never absent.
pub trait SecretReader: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Option<String>>;
}

/// Reads secrets from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSecretReader;

impl SecretReader for FsSecretReader {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "secret file unreadable");
                Err(e)
            }
        }
    }
}

/// In-memory secrets keyed by resolved path.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretReader {
    secrets: HashMap<PathBuf, String>,
}

impl MemorySecretReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, path: impl Into<PathBuf>, value: impl Into<String>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, value: impl Into<String>) {
        self.secrets.insert(path.into(), value.into());
    }
}

impl SecretReader for MemorySecretReader {
    fn read(&self, path: &Path) -> io::Result<Option<String>> {
        Ok(self.secrets.get(path).cloned())
    }
}

/// Resolve a secret reference against the base path.
pub fn resolve_secret_path(reference: &str, base: Option<&Path>) -> PathBuf {
    let reference = Path::new(reference);
    match base {
        Some(base) if reference.is_relative() => base.join(reference),
        _ => reference.to_path_buf(),
    }
}

/// Default secrets base path: `/run/secrets` when present, otherwise
/// `<config dir>/strata/secrets`.
pub fn default_secrets_dir() -> Option<PathBuf> {
    let run = PathBuf::from("/run/secrets");
    if run.is_dir() {
        return Some(run);
    }
    dirs::config_dir().map(|d| d.join("strata").join("secrets"))
}
