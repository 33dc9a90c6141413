//! Backend selection
//!
//! Decides once, at startup, which backend the typed store delegates to.
//! In `auto` mode the extension database is probed; if it cannot be opened
//! the local storage file is used instead. Selection never fails.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::backend::{BackendKind, StorageBackend};
use super::extension::ExtensionStorage;
use super::local::LocalStorage;
use super::memory::MemoryStorage;

/// Which backend the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Extension storage when available, local storage otherwise
    #[default]
    Auto,
    Extension,
    Local,
    Memory,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "extension" => Ok(BackendPreference::Extension),
            "local" => Ok(BackendPreference::Local),
            "memory" => Ok(BackendPreference::Memory),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Outcome of backend selection
#[derive(Clone)]
pub struct SelectedBackend {
    /// Backend every document operation routes to
    pub backend: Arc<dyn StorageBackend>,
    /// Durable local storage, always available for the theme preference
    pub local: Arc<LocalStorage>,
}

impl SelectedBackend {
    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }
}

/// Pick the backend for this process
pub fn select_backend(data_dir: &Path, preference: BackendPreference) -> SelectedBackend {
    let local = Arc::new(match preference {
        BackendPreference::Memory => LocalStorage::in_memory(),
        _ => LocalStorage::open(data_dir),
    });

    let backend: Arc<dyn StorageBackend> = match preference {
        BackendPreference::Auto | BackendPreference::Extension => {
            match ExtensionStorage::open(data_dir) {
                Ok(storage) => Arc::new(storage),
                Err(e) => {
                    if preference == BackendPreference::Extension {
                        tracing::warn!(error = %e, "Extension storage requested but unavailable, using local storage");
                    } else {
                        tracing::debug!(error = %e, "Extension storage unavailable, using local storage");
                    }
                    Arc::clone(&local) as Arc<dyn StorageBackend>
                }
            }
        }
        BackendPreference::Local => Arc::clone(&local) as Arc<dyn StorageBackend>,
        BackendPreference::Memory => Arc::new(MemoryStorage::new()),
    };

    tracing::info!(backend = %backend.kind(), data_dir = ?data_dir, "Selected storage backend");

    SelectedBackend { backend, local }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_auto_prefers_extension() {
        let dir = tempdir().unwrap();
        let selected = select_backend(dir.path(), BackendPreference::Auto);
        assert_eq!(selected.kind(), BackendKind::Extension);
    }

    #[test]
    fn test_auto_falls_back_to_local() {
        let dir = tempdir().unwrap();
        // A regular file where the data directory should be blocks the database
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"").unwrap();

        let selected = select_backend(&blocked, BackendPreference::Auto);
        assert_eq!(selected.kind(), BackendKind::Local);
    }

    #[test]
    fn test_explicit_preferences() {
        let dir = tempdir().unwrap();
        assert_eq!(
            select_backend(dir.path(), BackendPreference::Local).kind(),
            BackendKind::Local
        );
        assert_eq!(
            select_backend(dir.path(), BackendPreference::Memory).kind(),
            BackendKind::Memory
        );
    }

    #[test]
    fn test_preference_parsing() {
        assert_eq!("auto".parse(), Ok(BackendPreference::Auto));
        assert_eq!(" Local ".parse(), Ok(BackendPreference::Local));
        assert!("chrome".parse::<BackendPreference>().is_err());
    }
}
