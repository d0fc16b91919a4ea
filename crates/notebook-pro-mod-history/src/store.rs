/// Snapshot-based linear undo/redo history.
///
/// The store keeps a chronological list of snapshots and a cursor into it.
/// Undo and redo only move the cursor; a new snapshot pushed while the cursor
/// is behind the head abandons the redo branch.
use std::collections::VecDeque;

use crate::config::HistoryConfig;
use crate::snapshot::Snapshot;

/// Result of [`HistoryStore::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The snapshot became the new current entry.
    Appended {
        /// Whether the oldest entry was dropped to stay within the bound.
        evicted: bool,
    },
    /// The snapshot's content equals the current entry; nothing changed.
    Duplicate,
    /// Recording is paused; nothing changed.
    Paused,
}

impl PushOutcome {
    pub fn is_appended(&self) -> bool {
        matches!(self, Self::Appended { .. })
    }
}

/// Manages the snapshot history of a single document.
pub struct HistoryStore {
    /// Snapshots, oldest first.
    entries: VecDeque<Snapshot>,
    /// Index of the current snapshot; `None` while the store is empty.
    position: Option<usize>,
    /// Upper bound on `entries.len()`.
    max_entries: usize,
    /// Cleared while a snapshot is being written back into the document.
    recording: bool,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("len", &self.entries.len())
            .field("position", &self.position)
            .field("max_entries", &self.max_entries)
            .field("recording", &self.recording)
            .finish()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl HistoryStore {
    /// Creates an empty store bounded by `config.max_entries` (at least 1).
    pub fn new(config: &HistoryConfig) -> Self {
        Self::with_capacity(config.max_entries)
    }

    /// Creates an empty store with an explicit bound.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            position: None,
            max_entries: max_entries.max(1),
            recording: true,
        }
    }

    /// Records a snapshot as the new current state.
    ///
    /// Drops it if recording is paused or if its content matches the current
    /// entry. Otherwise discards every entry after the current one, appends,
    /// and evicts the oldest entry when the bound is exceeded.
    pub fn push(&mut self, snapshot: Snapshot) -> PushOutcome {
        if !self.recording {
            return PushOutcome::Paused;
        }
        if self
            .current()
            .is_some_and(|cur| cur.content() == snapshot.content())
        {
            return PushOutcome::Duplicate;
        }

        let keep = self.position.map_or(0, |p| p + 1);
        self.entries.truncate(keep);
        self.entries.push_back(snapshot);
        let mut position = self.entries.len() - 1;

        let evicted = self.entries.len() > self.max_entries;
        if evicted {
            self.entries.pop_front();
            position = position.saturating_sub(1);
        }
        self.position = Some(position);

        tracing::trace!(len = self.entries.len(), position, evicted, "snapshot recorded");
        PushOutcome::Appended { evicted }
    }

    /// Steps back one entry and returns it, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        let position = self.position? - 1;
        self.position = Some(position);
        self.entries.get(position)
    }

    /// Steps forward one entry and returns it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        let position = self.position? + 1;
        self.position = Some(position);
        self.entries.get(position)
    }

    pub fn can_undo(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.entries.len())
    }

    /// The snapshot at the current position.
    pub fn current(&self) -> Option<&Snapshot> {
        self.position.and_then(|p| self.entries.get(p))
    }

    /// Current index, or `None` while empty.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// All snapshots, oldest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Snapshot> {
        self.entries.iter()
    }

    /// Temporarily refuses new snapshots (used while restoring one).
    pub fn pause_recording(&mut self) {
        self.recording = false;
    }

    /// Accepts new snapshots again after a pause.
    pub fn resume_recording(&mut self) {
        self.recording = true;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Drops every snapshot and returns to the empty state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = None;
    }
}
