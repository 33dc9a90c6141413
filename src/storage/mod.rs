//! Tabdash Storage
//!
//! This module provides the persistence layer behind the dashboard:
//!
//! - **types**: The stored document, its fixed keys and settings record
//! - **backend**: The key-value backend contract
//! - **extension**: SQLite-backed extension storage
//! - **local**: Synchronous local storage with a JSON file
//! - **memory**: In-process backend with failure injection
//! - **selector**: One-time backend selection
//! - **store**: Typed accessor that never fails
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Container → Store::get/set (typed, defaults, never fails)
//!           → selected StorageBackend (extension | local | memory)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tabdash::storage::{keys, select_backend, BackendPreference, Store};
//!
//! #[tokio::main]
//! async fn main() {
//!     let selected = select_backend(Path::new("./data"), BackendPreference::Auto);
//!     let store = Store::new(selected.backend);
//!
//!     let mut settings = store.get(keys::Settings).await;
//!     settings.use24_hour = true;
//!     store.set(keys::Settings, &settings).await;
//! }
//! ```

pub mod backend;
pub mod error;
pub mod extension;
pub mod local;
pub mod memory;
pub mod selector;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendKind, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use extension::{ExtensionStorage, EXTENSION_DB_FILE};
pub use local::{LocalStorage, PreferenceStorage, LOCAL_STORAGE_FILE};
pub use memory::MemoryStorage;
pub use selector::{select_backend, BackendPreference, SelectedBackend};
pub use store::{Store, StoreFailure, StoreOp};
pub use types::{keys, CustomLink, SettingsRecord, StorageKey, StoredDocument, DOCUMENT_KEYS};
