//! Typed key-value store
//!
//! The only path from the dashboard to a backend. It never fails: read
//! errors turn into the key's default, write errors are dropped. Every
//! swallowed error is logged and published as a [`StoreFailure`].

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::backend::{BackendKind, StorageBackend};
use super::error::{StorageError, StorageResult};
use super::types::{keys, StorageKey, StoredDocument};

/// Capacity of the failure broadcast channel
const FAILURE_CHANNEL_CAPACITY: usize = 64;

/// Operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOp {
    Read,
    Write,
}

/// A backend failure the store swallowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreFailure {
    pub op: StoreOp,
    pub key: &'static str,
    pub error: String,
}

/// Typed accessor over the selected backend
pub struct Store {
    backend: Arc<dyn StorageBackend>,
    failures: broadcast::Sender<StoreFailure>,
}

impl Store {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);
        Self { backend, failures }
    }

    /// Kind of the backend this store delegates to
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Receive every failure swallowed from now on
    pub fn subscribe_failures(&self) -> broadcast::Receiver<StoreFailure> {
        self.failures.subscribe()
    }

    /// Value stored under `key`, or its default
    pub async fn get<K: StorageKey>(&self, _key: K) -> K::Value {
        match self.try_get::<K>().await {
            Ok(Some(value)) => value,
            Ok(None) => K::default_value(),
            Err(e) => {
                tracing::error!(key = K::NAME, error = %e, "Failed to get data");
                self.report(StoreOp::Read, K::NAME, &e);
                K::default_value()
            }
        }
    }

    /// Write `value` under `key`; failures are logged and dropped
    pub async fn set<K: StorageKey>(&self, _key: K, value: &K::Value) {
        if let Err(e) = self.try_set::<K>(value).await {
            tracing::error!(key = K::NAME, error = %e, "Failed to set data");
            self.report(StoreOp::Write, K::NAME, &e);
        } else {
            tracing::trace!(key = K::NAME, "Stored data");
        }
    }

    /// Every key of the document, defaults filled in
    pub async fn load_document(&self) -> StoredDocument {
        StoredDocument {
            command_history: self.get(keys::CommandHistory).await,
            notepad_content: self.get(keys::NotepadContent).await,
            settings: self.get(keys::Settings).await,
        }
    }

    async fn try_get<K: StorageKey>(&self) -> StorageResult<Option<K::Value>> {
        match self.backend.get(K::NAME).await? {
            Some(raw) => Ok(Some(serde_json::from_value(raw)?)),
            None => Ok(None),
        }
    }

    async fn try_set<K: StorageKey>(&self, value: &K::Value) -> StorageResult<()> {
        let raw = serde_json::to_value(value)?;
        self.backend.set(K::NAME, &raw).await
    }

    fn report(&self, op: StoreOp, key: &'static str, error: &StorageError) {
        // No subscribers is the normal case
        let _ = self.failures.send(StoreFailure {
            op,
            key,
            error: error.to_string(),
        });
    }
}
