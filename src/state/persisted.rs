//! Write-through containers
//!
//! A [`PersistedStore`] holds the in-memory value of one document key.
//! Mutations are visible to subscribers immediately and mirrored to the
//! [`Store`] on a spawned task. The in-memory value is never rolled back,
//! whatever happens to the write.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::storage::{keys, CustomLink, SettingsRecord, StorageKey, Store};

/// Observable value of a single document key with write-through
pub struct PersistedStore<K: StorageKey> {
    key: K,
    store: Arc<Store>,
    value: watch::Sender<K::Value>,
}

/// Settings container
pub type SettingsStore = PersistedStore<keys::Settings>;

/// Notepad container
pub type NotepadStore = PersistedStore<keys::NotepadContent>;

/// Command history container
pub type CommandHistoryStore = PersistedStore<keys::CommandHistory>;

impl<K: StorageKey> PersistedStore<K> {
    /// Create a container holding the compiled default for `key`
    ///
    /// The value is not trusted until [`init`](Self::init) has run.
    pub fn new(key: K, store: Arc<Store>) -> Self {
        let (value, _) = watch::channel(K::default_value());
        Self { key, store, value }
    }

    /// Load the persisted value and publish it
    pub async fn init(&self) {
        let loaded = self.store.get(self.key).await;
        self.value.send_replace(loaded);
        tracing::debug!(key = K::NAME, "Loaded persisted value");
    }

    /// Current in-memory value
    pub fn get(&self) -> K::Value {
        self.value.borrow().clone()
    }

    /// Observe every change to the value
    pub fn subscribe(&self) -> watch::Receiver<K::Value> {
        self.value.subscribe()
    }

    /// Replace the value and write it through
    ///
    /// The returned handle completes once the write has been attempted.
    /// Dropping it does not cancel the write.
    pub fn set(&self, value: K::Value) -> JoinHandle<()> {
        self.value.send_replace(value.clone());
        self.write_through(value)
    }

    /// Replace the value with `f(current)` and write it through
    ///
    /// The result is written even when it equals the current value.
    pub fn update<F>(&self, f: F) -> JoinHandle<()>
    where
        F: FnOnce(&K::Value) -> K::Value,
    {
        let mut next = None;
        self.value.send_modify(|current| {
            let value = f(current);
            *current = value.clone();
            next = Some(value);
        });

        // send_modify always runs the closure
        let value = next.unwrap_or_else(|| self.get());
        self.write_through(value)
    }

    fn write_through(&self, value: K::Value) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let key = self.key;
        tokio::spawn(async move {
            store.set(key, &value).await;
        })
    }
}

impl PersistedStore<keys::Settings> {
    /// Add a custom link, replacing any existing link with the same title
    pub fn add_link(&self, title: &str, url: &str) -> JoinHandle<()> {
        let title = title.trim().to_string();
        let url = url.trim().to_string();
        self.update(move |current| {
            let mut next = current.clone();
            next.custom_links.retain(|link| link.title != title);
            next.custom_links.push(CustomLink::new(title, url));
            next
        })
    }

    /// Remove every custom link titled `title`
    pub fn remove_link(&self, title: &str) -> JoinHandle<()> {
        self.update(|current| SettingsRecord {
            custom_links: current
                .custom_links
                .iter()
                .filter(|link| link.title != title)
                .cloned()
                .collect(),
            ..current.clone()
        })
    }
}

impl PersistedStore<keys::CommandHistory> {
    /// Record a command at the front of the history
    ///
    /// Blank commands are ignored. A command already in the history moves to
    /// the front; the list keeps at most `max_entries` entries.
    pub fn record(&self, command: &str, max_entries: usize) -> Option<JoinHandle<()>> {
        let command = command.trim();
        if command.is_empty() {
            return None;
        }

        Some(self.update(|current| {
            let mut next = Vec::with_capacity(current.len() + 1);
            next.push(command.to_string());
            next.extend(current.iter().filter(|c| c.as_str() != command).cloned());
            next.truncate(max_entries);
            next
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageBackend, StoreOp};
    use serde_json::json;

    fn setup() -> (Arc<MemoryStorage>, Arc<Store>) {
        let backend = Arc::new(MemoryStorage::new());
        let store = Arc::new(Store::new(
            Arc::clone(&backend) as Arc<dyn StorageBackend>
        ));
        (backend, store)
    }

    #[tokio::test]
    async fn test_holds_default_until_init() {
        let (backend, store) = setup();
        backend.insert("settings", json!({ "displayName": "Grace" }));

        let settings = SettingsStore::new(keys::Settings, store);
        assert_eq!(settings.get(), SettingsRecord::default());

        settings.init().await;
        assert_eq!(settings.get().display_name, "Grace");
    }

    #[tokio::test]
    async fn test_set_publishes_before_write_completes() {
        let (backend, store) = setup();
        let settings = SettingsStore::new(keys::Settings, store);
        let mut rx = settings.subscribe();

        let next = SettingsRecord {
            use24_hour: true,
            ..SettingsRecord::default()
        };
        let handle = settings.set(next.clone());

        // Visible synchronously
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), next);

        handle.await.unwrap();
        assert_eq!(backend.raw("settings").unwrap()["use24Hour"], json!(true));
    }

    #[tokio::test]
    async fn test_identity_update_still_writes() {
        let (backend, store) = setup();
        let settings = SettingsStore::new(keys::Settings, store);

        settings.update(|current| current.clone()).await.unwrap();

        let writes = backend.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "settings");
        assert_eq!(
            writes[0].1,
            serde_json::to_value(SettingsRecord::default()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_new_value() {
        let (backend, store) = setup();
        let mut failures = store.subscribe_failures();
        let settings = SettingsStore::new(keys::Settings, store);
        backend.fail_writes(true);

        settings
            .update(|current| SettingsRecord {
                display_name: "Linus".to_string(),
                ..current.clone()
            })
            .await
            .unwrap();

        assert_eq!(settings.get().display_name, "Linus");
        assert!(backend.raw("settings").is_none());
        assert_eq!(failures.recv().await.unwrap().op, StoreOp::Write);
    }

    #[tokio::test]
    async fn test_independent_instances() {
        let (_, store) = setup();
        let a = NotepadStore::new(keys::NotepadContent, Arc::clone(&store));
        let b = NotepadStore::new(keys::NotepadContent, store);

        a.set("draft".to_string()).await.unwrap();
        assert_eq!(a.get(), "draft");
        assert_eq!(b.get(), "");

        b.init().await;
        assert_eq!(b.get(), "draft");
    }

    #[tokio::test]
    async fn test_custom_links() {
        let (_, store) = setup();
        let settings = SettingsStore::new(keys::Settings, store);

        settings.add_link("Docs", "https://docs.rs").await.unwrap();
        settings.add_link("Crates", "https://crates.io").await.unwrap();
        settings.add_link("Docs", " https://doc.rust-lang.org ").await.unwrap();

        let links = settings.get().custom_links;
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].url, "https://doc.rust-lang.org");

        settings.remove_link("Crates").await.unwrap();
        assert_eq!(settings.get().custom_links.len(), 1);
    }

    #[tokio::test]
    async fn test_history_record() {
        let (backend, store) = setup();
        let history = CommandHistoryStore::new(keys::CommandHistory, store);

        assert!(history.record("   ", 3).is_none());
        for cmd in ["ls", "pwd", "ls", "whoami", "date"] {
            history.record(cmd, 3).unwrap().await.unwrap();
        }

        assert_eq!(history.get(), vec!["date", "whoami", "ls"]);
        assert_eq!(
            backend.raw("commandHistory"),
            Some(json!(["date", "whoami", "ls"]))
        );
    }
}
