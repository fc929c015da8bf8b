//! Session settings: defaults, deep-merge load, persistence.
//!
//! Every field carries a serde default, so loading a persisted partial object
//! (say `{"llm":{"model":"x"}}`) performs a field-wise merge over defaults
//! within each group — unspecified fields never get dropped.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::storage::{KeyValueStore, SETTINGS_KEY};

/// Process-wide session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub ui: UiSettings,
    pub voice: VoiceSettings,
    pub advanced: AdvancedSettings,
}

/// Provider and model configuration read by the provider adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "aipipe".into(),
            api_key: String::new(),
            model: "default".into(),
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UiSettings {
    pub theme: String,
    pub animations_enabled: bool,
    pub sound_enabled: bool,
    pub font_size: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "auto".into(),
            animations_enabled: true,
            sound_enabled: false,
            font_size: "medium".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct VoiceSettings {
    pub enabled: bool,
    pub output_enabled: bool,
    pub language: String,
    pub speech_rate: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            output_enabled: false,
            language: "en-US".into(),
            speech_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedSettings {
    pub auto_save: bool,
    pub analytics_enabled: bool,
    pub max_history: u32,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            analytics_enabled: false,
            max_history: 100,
        }
    }
}

impl Settings {
    /// Load persisted settings merged over defaults.
    ///
    /// A missing record yields pure defaults; a corrupt record falls back to
    /// defaults with a warning rather than blocking startup.
    pub fn load(storage: &dyn KeyValueStore) -> Self {
        match storage.read(SETTINGS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!(error = %err, "stored settings unreadable, using defaults");
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(error = %err, "could not read stored settings, using defaults");
                Self::default()
            }
        }
    }

    /// Persist the full settings object.
    pub fn save(&self, storage: &dyn KeyValueStore) -> Result<()> {
        let raw = serde_json::to_string(self)?;
        storage.write(SETTINGS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_reference_values() {
        let s = Settings::default();
        assert_eq!(s.llm.provider, "aipipe");
        assert_eq!(s.llm.max_tokens, 2000);
        assert_eq!(s.llm.temperature, 0.7);
        assert!(s.advanced.auto_save);
        assert_eq!(s.advanced.max_history, 100);
        assert_eq!(s.voice.language, "en-US");
    }

    #[test]
    fn partial_group_merges_over_defaults() {
        let store = MemoryStore::new().with_record(SETTINGS_KEY, r#"{"llm":{"model":"x"}}"#);
        let s = Settings::load(&store);
        assert_eq!(s.llm.model, "x");
        assert_eq!(s.llm.provider, "aipipe");
        assert_eq!(s.llm.max_tokens, 2000);
        assert_eq!(s.ui, UiSettings::default());
    }

    #[test]
    fn corrupt_record_falls_back_to_defaults() {
        let store = MemoryStore::new().with_record(SETTINGS_KEY, "not json");
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let mut s = Settings::default();
        s.llm.provider = "openai".into();
        s.ui.theme = "dark".into();
        s.save(&store).unwrap();
        assert_eq!(Settings::load(&store), s);
    }
}
