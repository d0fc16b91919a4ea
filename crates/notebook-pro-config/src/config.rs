/// Application configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

const CONFIG_FILE_NAME: &str = "notebook-pro.json";

/// Smallest history bound that still leaves one undo step.
const MIN_HISTORY_ENTRIES: usize = 2;
const MAX_HISTORY_ENTRIES: usize = 10_000;
const MAX_CAPTURE_DEBOUNCE_MS: u64 = 10_000;

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotebookConfig {
    /// Max snapshots kept per document before the oldest is evicted.
    pub history_max_entries: usize,
    /// Quiet period after the last edit before a snapshot is captured.
    pub capture_debounce_ms: u64,
    /// Seed every new history with an empty snapshot so the first edit can be
    /// undone back to a blank document.
    pub allow_undo_to_empty: bool,
    /// Background painted behind search matches.
    pub highlight_color: HexColor,
    /// Suffix appended to tab labels of modified documents.
    pub modified_marker: String,
    /// How many document names the unsaved-changes prompt lists before
    /// collapsing the rest into a count.
    pub unsaved_preview_limit: usize,
    /// Base title for new tabs ("Untitled", "Untitled 2", ...).
    pub untitled_prefix: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            history_max_entries: 400,
            capture_debounce_ms: 400,
            allow_undo_to_empty: true,
            highlight_color: HexColor::YELLOW,
            modified_marker: "*".to_string(),
            unsaved_preview_limit: 5,
            untitled_prefix: "Untitled".to_string(),
        }
    }
}

impl NotebookConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `notebook-pro.json` next to the executable, if it already exists
    /// 2. `<user config dir>/notebook-pro/notebook-pro.json`
    /// 3. `notebook-pro.json` in the working directory
    pub fn config_path() -> PathBuf {
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join(CONFIG_FILE_NAME)));
        if let Some(path) = beside_exe.filter(|p| p.exists()) {
            return path;
        }
        dirs::config_dir()
            .map(|d| d.join("notebook-pro").join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (unreadable file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<NotebookConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Leave a broken file alone so the user can fix it
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        self.history_max_entries = self
            .history_max_entries
            .clamp(MIN_HISTORY_ENTRIES, MAX_HISTORY_ENTRIES);
        self.capture_debounce_ms = self.capture_debounce_ms.min(MAX_CAPTURE_DEBOUNCE_MS);
        if self.modified_marker.trim().is_empty() {
            self.modified_marker = "*".to_string();
        }
        if self.untitled_prefix.trim().is_empty() {
            self.untitled_prefix = "Untitled".to_string();
        }
    }
}
