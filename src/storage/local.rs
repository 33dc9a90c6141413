//! Local Storage - synchronous string key-value map with JSON file persistence
//!
//! Mirrors browser `localStorage`: values are plain strings, reads never
//! touch the disk, and every write rewrites the backing file. Used both as
//! the fallback document backend (values stored as JSON text) and as the
//! durable home of the theme preference.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::backend::{BackendKind, StorageBackend};
use super::error::{StorageError, StorageResult};

/// File name of the local storage map inside the data directory
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// Synchronous string key-value storage
pub trait PreferenceStorage: Send + Sync {
    /// Raw string stored under `key`
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// File-backed local storage
#[derive(Debug)]
pub struct LocalStorage {
    items: RwLock<BTreeMap<String, String>>,
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
}

impl LocalStorage {
    /// Open the local storage file in `data_dir`
    ///
    /// A missing or unreadable file starts out empty; the next write
    /// replaces it.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(LOCAL_STORAGE_FILE);

        let items = if path.exists() {
            match Self::load_from_file(&path) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Ignoring unreadable local storage");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Self {
            items: RwLock::new(items),
            path: Some(path),
        }
    }

    /// Local storage that is never written to disk
    pub fn in_memory() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Path of the backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_from_file(path: &Path) -> StorageResult<BTreeMap<String, String>> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let items = serde_json::from_reader(reader).map_err(|e| {
            StorageError::Serialization(format!("Failed to load local storage: {}", e))
        })?;
        Ok(items)
    }

    fn save_to_file(path: &Path, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write to a temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, items)?;
            writer.flush()?;
        }
        std::fs::rename(&temp_path, path)?;

        Ok(())
    }
}

impl PreferenceStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        let Some(path) = &self.path else {
            items.insert(key.to_string(), value.to_string());
            return Ok(());
        };

        // A failed save leaves the stored value unchanged
        let mut next = items.clone();
        next.insert(key.to_string(), value.to_string());
        Self::save_to_file(path, &next)?;
        *items = next;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        match self.get_item(key) {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let text = serde_json::to_string(value)?;
        self.set_item(key, &text)
    }
}
