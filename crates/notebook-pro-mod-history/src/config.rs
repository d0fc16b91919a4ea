/// Configuration for the history system.
use std::time::Duration;

use notebook_pro_config::NotebookConfig;

/// Maximum number of snapshots kept per document.
/// The oldest snapshot is evicted when this limit is exceeded.
const DEFAULT_MAX_ENTRIES: usize = 400;

/// Quiet period in milliseconds after the last edit before a snapshot
/// is captured.
const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Configuration for one document's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max snapshots kept in the store.
    pub max_entries: usize,
    /// Capture debounce interval in milliseconds.
    pub debounce_ms: u64,
    /// Whether a fresh history is seeded with an empty snapshot.
    pub allow_undo_to_empty: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            allow_undo_to_empty: true,
        }
    }
}

impl HistoryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl From<&NotebookConfig> for HistoryConfig {
    fn from(config: &NotebookConfig) -> Self {
        Self {
            // A store needs room for the seed plus one real state.
            max_entries: config.history_max_entries.max(2),
            debounce_ms: config.capture_debounce_ms,
            allow_undo_to_empty: config.allow_undo_to_empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_entries, 400);
        assert_eq!(config.debounce_ms, 400);
        assert!(config.allow_undo_to_empty);
        assert_eq!(config.debounce(), Duration::from_millis(400));
    }

    #[test]
    fn test_from_app_config() {
        let app = NotebookConfig {
            history_max_entries: 25,
            capture_debounce_ms: 50,
            allow_undo_to_empty: false,
            ..Default::default()
        };
        let config = HistoryConfig::from(&app);
        assert_eq!(config.max_entries, 25);
        assert_eq!(config.debounce_ms, 50);
        assert!(!config.allow_undo_to_empty);
    }

    #[test]
    fn test_from_unsanitized_app_config_keeps_minimum_bound() {
        let app = NotebookConfig {
            history_max_entries: 0,
            ..Default::default()
        };
        assert_eq!(HistoryConfig::from(&app).max_entries, 2);
    }
}
