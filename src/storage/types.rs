//! Persisted data types
//!
//! The stored document is a fixed set of top-level keys. Each key is a unit
//! type implementing [`StorageKey`], so the value type of a `get`/`set` is
//! determined at compile time by the key passed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{StorageError, StorageResult};

/// A fixed top-level key of the stored document
pub trait StorageKey: Copy + Send + Sync + 'static {
    /// Value stored under this key
    type Value: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Name of the key in the backend
    const NAME: &'static str;

    /// Value returned when the key has never been written (or cannot be read)
    fn default_value() -> Self::Value;
}

/// Keys of the stored document
pub mod keys {
    use super::{SettingsRecord, StorageKey};

    /// `commandHistory`: most recent command first
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandHistory;

    /// `notepadContent`: free-form notepad text
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NotepadContent;

    /// `settings`: dashboard settings
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Settings;

    impl StorageKey for CommandHistory {
        type Value = Vec<String>;
        const NAME: &'static str = "commandHistory";

        fn default_value() -> Self::Value {
            Vec::new()
        }
    }

    impl StorageKey for NotepadContent {
        type Value = String;
        const NAME: &'static str = "notepadContent";

        fn default_value() -> Self::Value {
            String::new()
        }
    }

    impl StorageKey for Settings {
        type Value = SettingsRecord;
        const NAME: &'static str = "settings";

        fn default_value() -> Self::Value {
            SettingsRecord::default()
        }
    }
}

/// All top-level key names, in document order
pub const DOCUMENT_KEYS: [&str; 3] = [
    <keys::CommandHistory as StorageKey>::NAME,
    <keys::NotepadContent as StorageKey>::NAME,
    <keys::Settings as StorageKey>::NAME,
];

/// A user-defined link shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLink {
    pub title: String,
    pub url: String,
}

impl CustomLink {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Dashboard settings
///
/// Fields missing from the stored record take the value from
/// [`SettingsRecord::default`]; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsRecord {
    pub use24_hour: bool,
    pub show_greeting: bool,
    pub show_pomodoro: bool,
    pub show_notepad: bool,
    pub show_weather: bool,
    #[serde(rename = "showGitHubStats")]
    pub show_github_stats: bool,
    pub show_top_sites: bool,
    pub show_tech_news: bool,
    pub show_system_stats: bool,
    pub github_username: String,
    pub github_token: String,
    pub display_name: String,
    pub custom_links: Vec<CustomLink>,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            use24_hour: false,
            show_greeting: true,
            show_pomodoro: false,
            show_notepad: false,
            show_weather: true,
            show_github_stats: true,
            show_top_sites: true,
            show_tech_news: true,
            show_system_stats: false,
            github_username: String::new(),
            github_token: String::new(),
            display_name: String::new(),
            custom_links: Vec::new(),
        }
    }
}

impl SettingsRecord {
    /// Copy of this record with one field, named as stored, set from text
    ///
    /// Booleans accept `true`/`false`, strings take the text as is, and
    /// `customLinks` expects a JSON array.
    pub fn with_field(&self, name: &str, raw: &str) -> StorageResult<Self> {
        let mut value = serde_json::to_value(self)?;
        let fields = value
            .as_object_mut()
            .ok_or_else(|| StorageError::Serialization("settings are not an object".to_string()))?;

        let parsed = match fields.get(name) {
            Some(Value::Bool(_)) => Value::Bool(raw.trim().parse::<bool>().map_err(|_| {
                StorageError::Serialization(format!("{} expects true or false", name))
            })?),
            Some(Value::String(_)) => Value::String(raw.to_string()),
            Some(_) => serde_json::from_str(raw)?,
            None => {
                return Err(StorageError::Serialization(format!(
                    "Unknown setting: {}",
                    name
                )))
            }
        };
        fields.insert(name.to_string(), parsed);

        Ok(serde_json::from_value(value)?)
    }
}

/// The full persisted record
///
/// Never written as a unit: each field lives under its own key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredDocument {
    pub command_history: Vec<String>,
    pub notepad_content: String,
    pub settings: SettingsRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_wire_names() {
        let value = serde_json::to_value(SettingsRecord::default()).unwrap();
        let obj = value.as_object().unwrap();

        for name in [
            "use24Hour",
            "showGreeting",
            "showPomodoro",
            "showNotepad",
            "showWeather",
            "showGitHubStats",
            "showTopSites",
            "showTechNews",
            "showSystemStats",
            "githubUsername",
            "githubToken",
            "displayName",
            "customLinks",
        ] {
            assert!(obj.contains_key(name), "missing field {}", name);
        }
        assert_eq!(obj.len(), 13);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let stored = json!({ "use24Hour": true, "displayName": "Ada" });
        let settings: SettingsRecord = serde_json::from_value(stored).unwrap();

        assert!(settings.use24_hour);
        assert_eq!(settings.display_name, "Ada");
        assert!(settings.show_greeting);
        assert!(!settings.show_system_stats);
        assert!(settings.custom_links.is_empty());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let stored = json!({ "showWeather": false, "legacyWidget": true });
        let settings: SettingsRecord = serde_json::from_value(stored).unwrap();

        assert!(!settings.show_weather);
        assert_eq!(
            settings,
            SettingsRecord {
                show_weather: false,
                ..SettingsRecord::default()
            }
        );
    }

    #[test]
    fn test_document_keys() {
        assert_eq!(
            DOCUMENT_KEYS,
            ["commandHistory", "notepadContent", "settings"]
        );
    }

    #[test]
    fn test_stored_document_defaults() {
        let doc: StoredDocument = serde_json::from_value(json!({})).unwrap();
        assert!(doc.command_history.is_empty());
        assert!(doc.notepad_content.is_empty());
        assert_eq!(doc.settings, SettingsRecord::default());
    }

    #[test]
    fn test_with_field() {
        let settings = SettingsRecord::default();

        let updated = settings.with_field("use24Hour", "true").unwrap();
        assert!(updated.use24_hour);

        let updated = updated.with_field("displayName", "Ada Lovelace").unwrap();
        assert_eq!(updated.display_name, "Ada Lovelace");

        let updated = updated
            .with_field("customLinks", r#"[{"title":"Docs","url":"https://docs.rs"}]"#)
            .unwrap();
        assert_eq!(updated.custom_links, vec![CustomLink::new("Docs", "https://docs.rs")]);

        assert!(settings.with_field("showWeather", "maybe").is_err());
        assert!(settings.with_field("legacyWidget", "true").is_err());
        assert!(settings.with_field("customLinks", "not json").is_err());
    }
}
