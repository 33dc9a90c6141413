//! Dashboard context
//!
//! Wires configuration into a running set of containers: backend selection,
//! the typed store, and every reactive container. Built once at startup.

use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::state::{
    CommandHistoryStore, NotepadStore, RootAttribute, SettingsStore, StaticSites,
    SystemColorScheme, ThemeApplier, ThemeEnvironment, ThemeStore, TopSitesProvider,
    TopSitesStore,
};
use crate::storage::{keys, select_backend, BackendKind, PreferenceStorage, Store};

/// Every container of a dashboard
pub struct Dashboard {
    pub store: Arc<Store>,
    pub settings: SettingsStore,
    pub notepad: NotepadStore,
    pub history: CommandHistoryStore,
    pub theme: Arc<ThemeStore>,
    /// System colour-scheme signal; feed platform changes in here
    pub system: Option<SystemColorScheme>,
    pub top_sites: TopSitesStore,
    /// Presentation attribute the theme is applied to
    pub root: Arc<RootAttribute>,
    /// Maximum command history length
    pub history_limit: usize,
    listener: OnceLock<Option<JoinHandle<()>>>,
}

impl Dashboard {
    /// Select the backend and build the containers
    ///
    /// Containers hold defaults until [`init`](Self::init) runs, except the
    /// theme, which reads its preference immediately.
    pub fn open(config: &Config) -> Self {
        let selected = select_backend(&config.storage.data_dir(), config.storage.backend);
        let store = Arc::new(Store::new(Arc::clone(&selected.backend)));

        let root = Arc::new(RootAttribute::new());
        let system = config.theme.system_preference.map(SystemColorScheme::new);
        let theme = Arc::new(ThemeStore::new(ThemeEnvironment {
            storage: Some(Arc::clone(&selected.local) as Arc<dyn PreferenceStorage>),
            system: system.clone(),
            applier: Some(Arc::clone(&root) as Arc<dyn ThemeApplier>),
        }));

        let provider = if config.top_sites.sites.is_empty() {
            None
        } else {
            Some(Arc::new(StaticSites::new(config.top_sites.sites.clone()))
                as Arc<dyn TopSitesProvider>)
        };

        Self {
            settings: SettingsStore::new(keys::Settings, Arc::clone(&store)),
            notepad: NotepadStore::new(keys::NotepadContent, Arc::clone(&store)),
            history: CommandHistoryStore::new(keys::CommandHistory, Arc::clone(&store)),
            top_sites: TopSitesStore::new(provider, config.top_sites.limit),
            store,
            theme,
            system,
            root,
            history_limit: config.history.max_entries,
            listener: OnceLock::new(),
        }
    }

    /// Load every persisted container and start following the system
    /// colour scheme
    pub async fn init(&self) {
        self.listener.get_or_init(|| self.theme.listen_for_system_changes());

        tokio::join!(
            self.settings.init(),
            self.notepad.init(),
            self.history.init(),
            self.top_sites.load(),
        );
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.store.backend_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ResolvedTheme, Site, Theme, ThemeState};
    use crate::storage::{BackendPreference, SettingsRecord};
    use std::time::Duration;
    use tempfile::tempdir;

    fn config_in(dir: &std::path::Path, backend: BackendPreference) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.to_string_lossy().to_string();
        config.storage.backend = backend;
        config
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path(), BackendPreference::Auto);

        {
            let dashboard = Dashboard::open(&config);
            assert_eq!(dashboard.backend_kind(), BackendKind::Extension);
            dashboard.init().await;

            let write = dashboard.settings.update(|s| SettingsRecord {
                display_name: "Ada".to_string(),
                ..s.clone()
            });
            write.await.unwrap();
            dashboard.notepad.set("todo".to_string()).await.unwrap();
            dashboard.theme.set_theme(Theme::Light);
        }

        let dashboard = Dashboard::open(&config);
        assert_eq!(dashboard.settings.get().display_name, "");
        dashboard.init().await;

        assert_eq!(dashboard.settings.get().display_name, "Ada");
        assert_eq!(dashboard.notepad.get(), "todo");
        assert_eq!(dashboard.theme.state().theme, Theme::Light);
        assert_eq!(dashboard.root.value(), Some(ResolvedTheme::Light));
    }

    #[tokio::test]
    async fn test_system_preference_and_sites_from_config() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path(), BackendPreference::Memory);
        config.theme.system_preference = Some(ResolvedTheme::Light);
        config.top_sites.sites = vec![Site::new("Docs", "https://docs.rs")];

        let dashboard = Dashboard::open(&config);
        dashboard.init().await;

        assert_eq!(dashboard.backend_kind(), BackendKind::Memory);
        assert_eq!(dashboard.theme.state().resolved_theme, ResolvedTheme::Light);
        assert_eq!(dashboard.top_sites.get(), config.top_sites.sites);
    }

    #[tokio::test]
    async fn test_auto_theme_follows_system_signal() {
        let dir = tempdir().unwrap();
        let mut config = config_in(dir.path(), BackendPreference::Memory);
        config.theme.system_preference = Some(ResolvedTheme::Dark);

        let dashboard = Dashboard::open(&config);
        dashboard.init().await;
        assert_eq!(dashboard.theme.state().resolved_theme, ResolvedTheme::Dark);

        let mut rx = dashboard.theme.subscribe();
        dashboard.system.as_ref().unwrap().set(ResolvedTheme::Light);

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .unwrap()
            .unwrap();
        let expected = ThemeState {
            theme: Theme::Auto,
            resolved_theme: ResolvedTheme::Light,
        };
        assert_eq!(*rx.borrow_and_update(), expected);
        assert_eq!(dashboard.root.value(), Some(ResolvedTheme::Light));
    }
}
