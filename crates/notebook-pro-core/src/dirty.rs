/// Unsaved-changes tracking for one document.
use chrono::{DateTime, Local};

/// Whether a document differs from what was last saved, plus the helper that
/// renders that state on a tab label.
#[derive(Debug, Clone)]
pub struct DirtyTracker {
    dirty: bool,
    /// Suffix shown on labels of modified documents (e.g. `*`).
    marker: String,
    last_saved_at: Option<DateTime<Local>>,
}

impl DirtyTracker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            dirty: false,
            marker: marker.into(),
            last_saved_at: None,
        }
    }

    /// Flags the document as modified. Returns true if it was clean before.
    pub fn mark_dirty(&mut self) -> bool {
        !std::mem::replace(&mut self.dirty, true)
    }

    /// Flags the document as saved.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
        self.last_saved_at = Some(Local::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Local>> {
        self.last_saved_at
    }

    /// Returns `label` with the modified marker appended when dirty, or with
    /// any trailing markers removed when clean.
    pub fn decorate_label(&self, label: &str) -> String {
        let base = if self.marker.is_empty() {
            label
        } else {
            label.trim_end_matches(self.marker.as_str())
        };
        if self.dirty {
            format!("{base}{}", self.marker)
        } else {
            base.to_string()
        }
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new("*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clean() {
        let tracker = DirtyTracker::default();
        assert!(!tracker.is_dirty());
        assert!(tracker.last_saved_at().is_none());
    }

    #[test]
    fn test_mark_dirty_reports_transition() {
        let mut tracker = DirtyTracker::default();
        assert!(tracker.mark_dirty());
        assert!(!tracker.mark_dirty());
        assert!(tracker.is_dirty());
    }

    #[test]
    fn test_mark_clean_stamps_save_time() {
        let mut tracker = DirtyTracker::default();
        tracker.mark_dirty();
        tracker.mark_clean();
        assert!(!tracker.is_dirty());
        assert!(tracker.last_saved_at().is_some());
    }

    #[test]
    fn test_decorate_label() {
        let mut tracker = DirtyTracker::default();
        assert_eq!(tracker.decorate_label("notes.txt"), "notes.txt");
        tracker.mark_dirty();
        assert_eq!(tracker.decorate_label("notes.txt"), "notes.txt*");
        // Never doubled up
        assert_eq!(tracker.decorate_label("notes.txt*"), "notes.txt*");
        tracker.mark_clean();
        assert_eq!(tracker.decorate_label("notes.txt**"), "notes.txt");
    }

    #[test]
    fn test_custom_marker() {
        let mut tracker = DirtyTracker::new(" (modified)");
        tracker.mark_dirty();
        assert_eq!(tracker.decorate_label("Untitled"), "Untitled (modified)");
    }
}
