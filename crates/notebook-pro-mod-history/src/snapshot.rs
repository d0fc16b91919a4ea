/// Core types for captured document states.
use serde::{Deserialize, Serialize};

/// Selection range in char offsets over the plain-text view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// 0-indexed char offset of the selection start (or caret).
    pub start: usize,
    /// Number of selected chars; 0 for a bare caret.
    pub len: usize,
}

impl Selection {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// A zero-length selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self::new(offset, 0)
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.len)
    }

    /// Clamps the range so it fits inside a text of `text_len` chars.
    pub fn clamp_to(self, text_len: usize) -> Self {
        let start = self.start.min(text_len);
        let len = self.len.min(text_len - start);
        Self { start, len }
    }
}

/// One captured state of a document: its formatted content plus the
/// selection at capture time.
///
/// Snapshots are immutable once created. The history store only appends,
/// evicts and repositions them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    content: String,
    selection: Selection,
}

impl Snapshot {
    pub fn new(content: impl Into<String>, selection: Selection) -> Self {
        Self {
            content: content.into(),
            selection,
        }
    }

    /// The empty document with the caret at the start.
    pub fn empty() -> Self {
        Self::new(String::new(), Selection::default())
    }

    /// Opaque formatted-content blob.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_default_is_caret_at_origin() {
        let sel = Selection::default();
        assert_eq!(sel, Selection::caret(0));
        assert_eq!(sel.end(), 0);
    }

    #[test]
    fn test_clamp_to_shorter_text() {
        assert_eq!(Selection::new(3, 10).clamp_to(5), Selection::new(3, 2));
        assert_eq!(Selection::new(8, 2).clamp_to(5), Selection::new(5, 0));
        assert_eq!(Selection::new(1, 2).clamp_to(5), Selection::new(1, 2));
        assert_eq!(Selection::new(0, 4).clamp_to(0), Selection::caret(0));
    }

    #[test]
    fn test_end_saturates() {
        assert_eq!(Selection::new(usize::MAX, 3).end(), usize::MAX);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = Snapshot::empty();
        assert!(snap.content().is_empty());
        assert_eq!(snap.selection(), Selection::default());
    }

    #[test]
    fn test_snapshot_serde_keeps_content_verbatim() {
        let snap = Snapshot::new("{\"text\":\"héllo\"}\n", Selection::new(2, 3));
        let json = serde_json::to_string(&snap).expect("serialize");
        let decoded: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, snap);
    }
}
