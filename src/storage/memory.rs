//! In-memory backend
//!
//! Nothing is persisted. Reads and writes can be made to fail on demand,
//! which makes this the substitute backend for exercising the store's
//! failure handling.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::backend::{BackendKind, StorageBackend};
use super::error::{StorageError, StorageResult};

/// In-process key-value backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, Value>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: RwLock<Vec<(String, Value)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without recording it as a write
    pub fn insert(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value);
        }
    }

    /// Make every subsequent read fail (or succeed again)
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `get` calls received
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Every successful `set` call, in arrival order
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes
            .read()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }

    /// Current raw value for `key`
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("read of {} refused", key)));
        }

        let values = self
            .values
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected(format!("write of {} refused", key)));
        }

        self.values
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .insert(key.to_string(), value.clone());

        self.writes
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .push((key.to_string(), value.clone()));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_injected_failures() {
        let storage = MemoryStorage::new();
        storage.insert("notepadContent", json!("seed"));

        storage.fail_reads(true);
        assert!(storage.get("notepadContent").await.is_err());
        storage.fail_reads(false);
        assert_eq!(
            storage.get("notepadContent").await.unwrap(),
            Some(json!("seed"))
        );

        storage.fail_writes(true);
        assert!(storage.set("notepadContent", &json!("x")).await.is_err());
        assert_eq!(storage.raw("notepadContent"), Some(json!("seed")));
        assert!(storage.writes().is_empty());
        assert_eq!(storage.read_count(), 2);
    }
}
