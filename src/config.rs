//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::state::{ResolvedTheme, Site, DEFAULT_TOP_SITES_LIMIT};
use crate::storage::BackendPreference;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub top_sites: TopSitesConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub backend: BackendPreference,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tabdash").to_string_lossy().to_string())
        .unwrap_or_else(|| "./tabdash_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendPreference::default(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Theme configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    /// System colour scheme; unset means no system signal
    pub system_preference: Option<ResolvedTheme>,
}

/// Top sites configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TopSitesConfig {
    #[serde(default = "default_top_sites_limit")]
    pub limit: usize,

    /// Static provider list; empty means the built-in fallback list
    #[serde(default)]
    pub sites: Vec<Site>,
}

fn default_top_sites_limit() -> usize {
    DEFAULT_TOP_SITES_LIMIT
}

impl Default for TopSitesConfig {
    fn default() -> Self {
        Self {
            limit: default_top_sites_limit(),
            sites: Vec::new(),
        }
    }
}

/// Command history configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_max_entries")]
    pub max_entries: usize,
}

fn default_history_max_entries() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_history_max_entries(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("tabdash").join("config.toml")),
            Some(PathBuf::from("./tabdash.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first readable config among `paths`, falling back to the
    /// environment
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(data_dir) = std::env::var("TABDASH_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Ok(backend) = std::env::var("TABDASH_BACKEND") {
            match backend.parse() {
                Ok(preference) => self.storage.backend = preference,
                Err(e) => tracing::warn!("Ignoring TABDASH_BACKEND: {}", e),
            }
        }

        if let Ok(scheme) = std::env::var("TABDASH_SYSTEM_THEME") {
            match scheme.parse() {
                Ok(scheme) => self.theme.system_preference = Some(scheme),
                Err(e) => tracing::warn!("Ignoring TABDASH_SYSTEM_THEME: {}", e),
            }
        }

        if let Ok(level) = std::env::var("TABDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TABDASH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tabdash Configuration
#
# Environment variables override these settings:
# - TABDASH_DATA_DIR
# - TABDASH_BACKEND
# - TABDASH_SYSTEM_THEME
# - TABDASH_LOG_LEVEL
# - TABDASH_LOG_FORMAT

[storage]
# Directory holding extension_storage.db and local_storage.json
data_dir = "~/.local/share/tabdash"

# auto (extension storage when available), extension, local or memory
backend = "auto"

[theme]
# System colour scheme followed by the "auto" theme: light or dark.
# Leave unset when there is no system signal ("auto" then resolves to dark).
# system_preference = "dark"

[top_sites]
# Number of sites shown
limit = 8

# Sites to show instead of the built-in list
# sites = [
#     { title = "GitHub", url = "https://github.com" },
# ]

[history]
# Commands kept in the history
max_entries = 50

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, BackendPreference::Auto);
        assert!(config.theme.system_preference.is_none());
        assert_eq!(config.top_sites.limit, 8);
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.storage.data_dir, "~/.local/share/tabdash");
        assert_eq!(config.storage.backend, BackendPreference::Auto);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [storage]
            backend = "local"

            [theme]
            system_preference = "light"

            [top_sites]
            sites = [{ title = "Docs", url = "https://docs.rs" }]
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, BackendPreference::Local);
        assert_eq!(config.theme.system_preference, Some(ResolvedTheme::Light));
        assert_eq!(config.top_sites.sites.len(), 1);
        assert_eq!(config.top_sites.limit, 8);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[storage]\nbackend = \"cloud\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/tabdash.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_first_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let valid = dir.path().join("valid.toml");
        std::fs::write(&broken, "[history\nmax_entries = 3").unwrap();
        std::fs::write(&valid, "[history]\nmax_entries = 7").unwrap();

        let paths = [dir.path().join("missing.toml"), broken, valid];
        assert_eq!(Config::load_first(&paths).history.max_entries, 7);
        assert_eq!(Config::load_first(&paths[..2]).history.max_entries, 50);
    }
}
