//! # Tabdash
//!
//! New Tab Dashboard - typed persistence and reactive state for a browser
//! new-tab dashboard: greetings, top sites, notes, command history, widget
//! settings and a light/dark/auto theme.
//!
//! ## Features
//!
//! - **Two storage backends**: SQLite extension storage with a local JSON
//!   storage fallback, selected once at startup
//! - **Typed access**: every document key fixes its value type at compile time
//! - **Never fails**: read errors become defaults, write errors are dropped
//!   (and reported on a side channel)
//! - **Reactive containers**: mutations are visible immediately and written
//!   through in the background
//! - **Theme resolution**: `auto` follows the system colour scheme live
//!
//! ## Modules
//!
//! - [`storage`]: Backends, selection and the typed store
//! - [`state`]: Settings, notepad, history, theme and top sites containers
//! - [`dashboard`]: Startup wiring from [`config`]
//! - [`greeting`]: Clock and greeting helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabdash::{Config, Dashboard, Theme};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dashboard = Dashboard::open(&Config::load_default());
//!     dashboard.init().await;
//!
//!     // Visible immediately, persisted in the background
//!     let write = dashboard.settings.update(|s| {
//!         let mut s = s.clone();
//!         s.use24_hour = true;
//!         s
//!     });
//!
//!     dashboard.theme.set_theme(Theme::Auto);
//!     println!("Rendering {}", dashboard.theme.state().resolved_theme);
//!
//!     // Wait for the write before exiting
//!     let _ = write.await;
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod greeting;
pub mod state;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    keys, select_backend, BackendKind, BackendPreference, CustomLink, ExtensionStorage,
    LocalStorage, MemoryStorage, PreferenceStorage, SelectedBackend, SettingsRecord,
    StorageBackend, StorageError, StorageKey, StorageResult, Store, StoreFailure, StoreOp,
    StoredDocument, DOCUMENT_KEYS,
};

pub use state::{
    CommandHistoryStore, NotepadStore, PersistedStore, ResolvedTheme, RootAttribute,
    SettingsStore, Site, StaticSites, SystemColorScheme, Theme, ThemeApplier, ThemeEnvironment,
    ThemeState, ThemeStore, TopSitesError, TopSitesProvider, TopSitesStore,
};

pub use config::{
    generate_default_config, Config, ConfigError, HistoryConfig, LoggingConfig, StorageConfig,
    ThemeConfig, TopSitesConfig,
};

pub use dashboard::Dashboard;

pub use greeting::{format_time, greeting, greeting_for_hour};
