//! Backend contract
//!
//! A backend is a plain key-value persistence mechanism. It knows nothing
//! about the document schema: values are JSON and keys are strings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::StorageResult;

/// Key-value persistence mechanism behind the typed store
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which kind of backend this is
    fn kind(&self) -> BackendKind;

    /// Read the value stored under `key`, or `None` if it was never written
    async fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Write `value` under `key`
    async fn set(&self, key: &str, value: &Value) -> StorageResult<()>;
}

/// The available backend implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Extension-grade asynchronous store (SQLite)
    Extension,
    /// Browser-local synchronous fallback (JSON file)
    Local,
    /// In-process map, nothing persisted
    Memory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Extension => "extension",
            BackendKind::Local => "local",
            BackendKind::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
