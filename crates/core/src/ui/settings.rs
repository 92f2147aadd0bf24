//! User settings persistence.
//!
//! This module handles loading and saving the generator's form preferences:
//! model choice, API key override and the last used tone, format and length.
//! Generated text is never written to disk.

use crate::error::Result;
use crate::prompt::{Format, Length, Tone};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Gemini models offered in the settings panel.
pub const AVAILABLE_MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-flash-latest",
    "gemini-flash-lite-latest",
];

/// User-configurable settings persisted between sessions.
///
/// Stored as JSON in the user's config directory
/// (e.g., `~/.config/generai/settings.json` on Linux).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected Gemini model name.
    pub model: String,
    /// API key override (takes precedence over environment).
    pub api_key: String,
    pub tone: Tone,
    pub format: Format,
    pub length: Length,
}

impl Settings {
    /// Returns the path to the settings file.
    ///
    /// Creates the config directory if it doesn't exist.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "generai", "generai").map(|dirs| {
            let config_dir = dirs.config_dir();
            if !config_dir.exists() {
                let _ = fs::create_dir_all(config_dir);
            }
            config_dir.join("settings.json")
        })
    }

    /// Loads settings from disk, falling back to defaults if not found.
    ///
    /// # Arguments
    /// * `default_model` - The model to use if no settings file exists.
    pub fn load(default_model: &str) -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_else(|| Self::with_defaults(default_model))
    }

    /// Reads settings from `path`. Missing or unreadable files yield `None`.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %path.display(), "ignoring unreadable settings file: {}", e);
                None
            }
        }
    }

    /// Creates default settings with the specified model.
    pub fn with_defaults(model: &str) -> Self {
        Self {
            model: model.to_string(),
            api_key: String::new(),
            tone: Tone::default(),
            format: Format::default(),
            length: Length::default(),
        }
    }

    /// Persists settings to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Returns whether the API key is set (either from settings or will use env).
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_defaults(crate::config::DEFAULT_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_form_defaults() {
        let settings = Settings::with_defaults("gemini-2.5-pro");
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.tone, Tone::Casual);
        assert_eq!(settings.format, Format::Paragraph);
        assert_eq!(settings.length, Length::Medium);
        assert!(!settings.has_api_key());
    }

    #[test]
    fn partial_json_fills_missing_fields() {
        let settings: Settings =
            serde_json::from_str(r#"{"model":"gemini-2.5-pro","tone":"funny"}"#).unwrap();
        assert_eq!(settings.model, "gemini-2.5-pro");
        assert_eq!(settings.tone, Tone::Funny);
        assert_eq!(settings.format, Format::Paragraph);
        assert_eq!(settings.api_key, "");
    }

    #[test]
    fn save_then_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.format = Format::BlogPost;
        settings.length = Length::Long;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_none());
    }

    #[test]
    fn missing_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Settings::load_from(&temp_dir.path().join("settings.json")).is_none());
    }
}
