//! State Management
//!
//! Reactive containers the dashboard reads and writes through. Each is an
//! explicit object built once at startup; any number of instances may exist.

pub mod persisted;
pub mod theme;
pub mod top_sites;

pub use persisted::{CommandHistoryStore, NotepadStore, PersistedStore, SettingsStore};
pub use theme::{
    ResolvedTheme, RootAttribute, SystemColorScheme, Theme, ThemeApplier, ThemeEnvironment,
    ThemeParseError, ThemeState, ThemeStore, THEME_ATTRIBUTE, THEME_STORAGE_KEY,
};
pub use top_sites::{
    fallback_sites, Site, StaticSites, TopSitesError, TopSitesProvider, TopSitesStore,
    DEFAULT_TOP_SITES_LIMIT,
};
