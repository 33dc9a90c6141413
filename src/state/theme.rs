//! Theme state
//!
//! The user picks `light`, `dark` or `auto`; the dashboard always renders a
//! concrete light or dark theme. In `auto` mode the resolved theme follows
//! the system colour-scheme signal for as long as the mode lasts.
//!
//! Every collaborator is optional. Without durable storage the preference is
//! `auto` and nothing is persisted; without a system signal `auto` resolves
//! to `dark`; without a presentation target nothing is applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::storage::PreferenceStorage;

/// Durable local storage key of the theme preference
pub const THEME_STORAGE_KEY: &str = "theme-preference";

/// Presentation attribute carrying the resolved theme
pub const THEME_ATTRIBUTE: &str = "data-theme";

/// The user's theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

/// A theme that can actually be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    /// Interpret a stored preference; anything unrecognised means `auto`
    pub fn from_stored(stored: Option<&str>) -> Self {
        stored
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl ResolvedTheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedTheme::Light => "light",
            ResolvedTheme::Dark => "dark",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ResolvedTheme::Light => ResolvedTheme::Dark,
            ResolvedTheme::Dark => ResolvedTheme::Light,
        }
    }
}

impl From<ResolvedTheme> for Theme {
    fn from(resolved: ResolvedTheme) -> Self {
        match resolved {
            ResolvedTheme::Light => Theme::Light,
            ResolvedTheme::Dark => Theme::Dark,
        }
    }
}

/// Error parsing a theme name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown theme: {0} (expected light, dark or auto)")]
pub struct ThemeParseError(pub String);

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "auto" => Ok(Theme::Auto),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

impl FromStr for ResolvedTheme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ResolvedTheme::Light),
            "dark" => Ok(ResolvedTheme::Dark),
            other => Err(ThemeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Published theme state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeState {
    pub theme: Theme,
    pub resolved_theme: ResolvedTheme,
}

/// System colour-scheme preference signal
///
/// Whoever owns the platform integration feeds changes in with
/// [`set`](Self::set); the theme store listens through
/// [`subscribe`](Self::subscribe).
#[derive(Debug, Clone)]
pub struct SystemColorScheme {
    tx: Arc<watch::Sender<ResolvedTheme>>,
}

impl SystemColorScheme {
    pub fn new(initial: ResolvedTheme) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Current system preference
    pub fn current(&self) -> ResolvedTheme {
        *self.tx.borrow()
    }

    /// Report a system preference change
    pub fn set(&self, scheme: ResolvedTheme) {
        self.tx.send_replace(scheme);
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolvedTheme> {
        self.tx.subscribe()
    }
}

/// Where the resolved theme gets applied
pub trait ThemeApplier: Send + Sync {
    fn apply(&self, resolved: ResolvedTheme);
}

/// A presentation attribute on the document root
#[derive(Debug, Default)]
pub struct RootAttribute {
    value: RwLock<Option<ResolvedTheme>>,
}

impl RootAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute name
    pub fn name(&self) -> &'static str {
        THEME_ATTRIBUTE
    }

    /// Last applied value
    pub fn value(&self) -> Option<ResolvedTheme> {
        self.value.read().ok().and_then(|value| *value)
    }
}

impl ThemeApplier for RootAttribute {
    fn apply(&self, resolved: ResolvedTheme) {
        if let Ok(mut value) = self.value.write() {
            *value = Some(resolved);
        }
        tracing::debug!(attribute = THEME_ATTRIBUTE, value = %resolved, "Applied theme");
    }
}

/// Collaborators available to the theme store
#[derive(Clone, Default)]
pub struct ThemeEnvironment {
    /// Durable storage for the preference
    pub storage: Option<Arc<dyn PreferenceStorage>>,
    /// System colour-scheme signal
    pub system: Option<SystemColorScheme>,
    /// Target for the resolved theme
    pub applier: Option<Arc<dyn ThemeApplier>>,
}

impl ThemeEnvironment {
    /// No storage, no system signal, nothing to apply to
    pub fn headless() -> Self {
        Self::default()
    }
}

/// Reactive theme container
pub struct ThemeStore {
    storage: Option<Arc<dyn PreferenceStorage>>,
    system: Option<watch::Receiver<ResolvedTheme>>,
    applier: Option<Arc<dyn ThemeApplier>>,
    state: watch::Sender<ThemeState>,
}

impl ThemeStore {
    /// Build the store from the persisted preference and the current system
    /// signal, applying the initial resolved theme once
    ///
    /// The store only observes the system signal; it does not keep it alive.
    pub fn new(env: ThemeEnvironment) -> Self {
        let ThemeEnvironment {
            storage,
            system,
            applier,
        } = env;

        let theme = Theme::from_stored(
            storage
                .as_ref()
                .and_then(|storage| storage.get_item(THEME_STORAGE_KEY))
                .as_deref(),
        );
        let system = system.map(|signal| signal.subscribe());

        let initial = ThemeState {
            theme,
            resolved_theme: resolve(theme, system.as_ref()),
        };
        let (state, _) = watch::channel(initial);

        let store = Self {
            storage,
            system,
            applier,
            state,
        };
        store.apply(initial.resolved_theme);

        tracing::debug!(theme = %initial.theme, resolved = %initial.resolved_theme, "Theme initialised");
        store
    }

    /// Current state
    pub fn state(&self) -> ThemeState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.state.subscribe()
    }

    /// Set and persist an explicit preference (or `auto`)
    pub fn set_theme(&self, theme: Theme) {
        let resolved_theme = resolve(theme, self.system.as_ref());
        self.persist(theme);
        self.apply(resolved_theme);
        self.state.send_replace(ThemeState {
            theme,
            resolved_theme,
        });
    }

    /// Pin the opposite of the currently resolved theme
    pub fn toggle_theme(&self) {
        let flipped = self.state().resolved_theme.flipped();
        self.set_theme(Theme::from(flipped));
    }

    /// React to a system preference change
    ///
    /// Only `auto` mode follows the system; explicit choices ignore it.
    pub fn handle_system_change(&self, scheme: ResolvedTheme) {
        if self.state().theme != Theme::Auto {
            return;
        }
        self.apply(scheme);
        self.state.send_replace(ThemeState {
            theme: Theme::Auto,
            resolved_theme: scheme,
        });
    }

    /// Follow the system signal on a background task
    ///
    /// Returns `None` when there is no system signal to follow. The task
    /// ends when the signal's owner drops it, or at the first change after
    /// the store itself is gone.
    pub fn listen_for_system_changes(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut rx = self.system.as_ref()?.clone();
        let store = Arc::downgrade(self);

        Some(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let scheme = *rx.borrow_and_update();
                let Some(store) = store.upgrade() else {
                    break;
                };
                tracing::debug!(scheme = %scheme, "System colour scheme changed");
                store.handle_system_change(scheme);
            }
            tracing::trace!("System colour scheme listener stopped");
        }))
    }

    fn persist(&self, theme: Theme) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = storage.set_item(THEME_STORAGE_KEY, theme.as_str()) {
            tracing::error!(error = %e, "Failed to persist theme preference");
        }
    }

    fn apply(&self, resolved: ResolvedTheme) {
        if let Some(applier) = &self.applier {
            applier.apply(resolved);
        }
    }
}

fn resolve(theme: Theme, system: Option<&watch::Receiver<ResolvedTheme>>) -> ResolvedTheme {
    match theme {
        Theme::Light => ResolvedTheme::Light,
        Theme::Dark => ResolvedTheme::Dark,
        Theme::Auto => system
            .map(|signal| *signal.borrow())
            .unwrap_or(ResolvedTheme::Dark),
    }
}
