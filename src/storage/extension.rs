//! Extension Storage - SQLite-backed asynchronous key-value store
//!
//! Values are stored as JSON text in a single `kv` table. Every operation
//! runs on the blocking pool so callers suspend without stalling the
//! runtime.

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::backend::{BackendKind, StorageBackend};
use super::error::{StorageError, StorageResult};

/// File name of the extension database inside the data directory
pub const EXTENSION_DB_FILE: &str = "extension_storage.db";

/// SQLite-backed extension storage
pub struct ExtensionStorage {
    /// std::sync::Mutex because the connection is used from blocking tasks only
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl ExtensionStorage {
    /// Open (or create) the extension database in `data_dir`
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(EXTENSION_DB_FILE);

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )",
            [],
        )?;

        tracing::debug!(path = ?path, "Opened extension storage");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Path to the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StorageError::Lock(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StorageError::Backend(format!("storage task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageBackend for ExtensionStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Extension
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let key = key.to_string();
        let raw: Option<String> = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                        row.get(0)
                    })
                    .optional()?)
            })
            .await?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let key = key.to_string();
        let text = serde_json::to_string(value)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?, ?)",
                params![key, text],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = ExtensionStorage::open(dir.path()).unwrap();

        assert!(storage.get("settings").await.unwrap().is_none());
        assert_eq!(storage.kind(), BackendKind::Extension);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let dir = tempdir().unwrap();
        let storage = ExtensionStorage::open(dir.path()).unwrap();

        storage.set("notepadContent", &json!("first")).await.unwrap();
        storage.set("notepadContent", &json!("second")).await.unwrap();

        let value = storage.get("notepadContent").await.unwrap();
        assert_eq!(value, Some(json!("second")));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let storage = ExtensionStorage::open(dir.path()).unwrap();
            storage
                .set("commandHistory", &json!(["ls", "git status"]))
                .await
                .unwrap();
        }

        let storage = ExtensionStorage::open(dir.path()).unwrap();
        let value = storage.get("commandHistory").await.unwrap();
        assert_eq!(value, Some(json!(["ls", "git status"])));
        assert!(storage.path().ends_with(EXTENSION_DB_FILE));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = ExtensionStorage::open(dir.path()).unwrap();

        storage
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO kv (key, value) VALUES ('settings', '{not json')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = storage.get("settings").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
