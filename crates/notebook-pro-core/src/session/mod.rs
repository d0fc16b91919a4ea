//! One open document: the surface plus its history, capture scheduler,
//! dirty flag and search highlighting.
//!
//! The session is driven by its host. Edits made directly on the surface are
//! picked up by [`DocumentSession::poll_changes`]; [`DocumentSession::tick`]
//! commits a snapshot once typing has paused. Programmatic writes (restoring
//! a snapshot, painting highlights) run with recording paused, and the change
//! notification they raise is drained before recording resumes, so they are
//! never captured as edits.

pub mod undo;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use notebook_pro_config::NotebookConfig;

use crate::dirty::DirtyTracker;
use crate::history::{self, HistoryConfig, HistoryStore, PushOutcome, Snapshot};
use crate::io::{self, TextFormat};
use crate::scheduler::CaptureScheduler;
use crate::search::{HighlightOverlay, SearchEngine, SearchMatch};
use crate::surface::EditableSurface;

pub use undo::{UndoDirection, UndoOutcome};
use undo::{NativeUndo, SnapshotHistory, UndoProvider};

/// Match count for the live search box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStatus {
    pub matches: usize,
}

impl std::fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Result(s): {}", self.matches)
    }
}

pub struct DocumentSession<S: EditableSurface> {
    label: String,
    surface: S,
    history: HistoryStore,
    scheduler: CaptureScheduler,
    dirty: DirtyTracker,
    overlay: HighlightOverlay,
    search: SearchEngine,
    /// Query currently highlighted; empty when search is inactive.
    live_query: String,
    path: Option<PathBuf>,
    format: TextFormat,
}

impl<S: EditableSurface> DocumentSession<S> {
    /// Starts tracking `surface`.
    ///
    /// The history is seeded with an empty snapshot (when undo to empty is
    /// allowed) and a snapshot of the surface's current content. The
    /// document starts clean.
    pub fn attach(label: impl Into<String>, surface: S, config: &NotebookConfig) -> Self {
        let history_config = HistoryConfig::from(config);
        let mut session = Self {
            label: label.into(),
            surface,
            history: HistoryStore::new(&history_config),
            scheduler: CaptureScheduler::new(history_config.debounce()),
            dirty: DirtyTracker::new(config.modified_marker.clone()),
            overlay: HighlightOverlay::new(config.highlight_color),
            search: SearchEngine::new(),
            live_query: String::new(),
            path: None,
            format: TextFormat::default(),
        };
        session.seed_history(history_config.allow_undo_to_empty);
        session
    }

    /// Opens a plain-text file into `surface`, replacing its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn open_file(path: &Path, mut surface: S, config: &NotebookConfig) -> Result<Self> {
        let file = io::read_text_file(path)?;
        surface.set_plain_text(&file.text);
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.untitled_prefix.clone());

        let mut session = Self::attach(label, surface, config);
        session.path = Some(path.to_path_buf());
        session.format = file.format;
        Ok(session)
    }

    fn seed_history(&mut self, allow_undo_to_empty: bool) {
        if self.history.is_empty() {
            if allow_undo_to_empty {
                self.history.push(Snapshot::empty());
            }
            if let Some(snapshot) = history::capture(&self.surface) {
                self.history.push(snapshot);
            }
        }
        self.surface.take_change_notification();
        tracing::debug!(label = %self.label, entries = self.history.len(), "attached document");
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The label with the modified marker when there are unsaved changes.
    pub fn display_label(&self) -> String {
        self.dirty.decorate_label(&self.label)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Direct access to the surface. Edits made through it are seen by the
    /// next [`DocumentSession::poll_changes`].
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn scheduler(&self) -> &CaptureScheduler {
        &self.scheduler
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty_tracker(&self) -> &DirtyTracker {
        &self.dirty
    }

    pub fn live_query(&self) -> &str {
        &self.live_query
    }

    pub fn is_highlighting(&self) -> bool {
        self.overlay.has_backup()
    }

    /// Runs `f` with recording paused, then drains the change notification
    /// it raised. Nests: the previous recording state is put back.
    fn with_recording_paused<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_recording = self.history.is_recording();
        self.history.pause_recording();
        let result = f(self);
        self.surface.take_change_notification();
        if was_recording {
            self.history.resume_recording();
        }
        result
    }

    /// Applies a user edit to the surface.
    ///
    /// While highlighting, the highlight is lifted for the edit and put back
    /// afterwards, so the edit lands on the real content and the backup
    /// stays in step with it.
    pub fn edit<R>(&mut self, now: Instant, f: impl FnOnce(&mut S) -> R) -> R {
        let highlighting = self.overlay.has_backup();
        if highlighting {
            self.with_recording_paused(|s| s.overlay.clear(&mut s.surface));
        }
        let result = f(&mut self.surface);
        self.poll_changes(now);
        if highlighting {
            self.refresh_highlight();
        }
        result
    }

    /// Picks up a change notification from the surface and restarts the
    /// capture countdown. Returns whether a change was seen.
    pub fn poll_changes(&mut self, now: Instant) -> bool {
        if !self.surface.take_change_notification() || !self.history.is_recording() {
            return false;
        }
        // Content moved under the highlight; the backup no longer matches it
        if self.overlay.has_backup() {
            self.overlay.invalidate(&mut self.surface);
            self.surface.take_change_notification();
        }
        self.scheduler.arm(now);
        true
    }

    /// Polls for changes and captures once the debounce interval has passed.
    /// Returns true if a snapshot was committed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.poll_changes(now);
        if self.scheduler.poll(now) {
            self.capture()
        } else {
            false
        }
    }

    /// When the pending capture is due, if one is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Captures the current content now, cancelling any pending capture.
    ///
    /// Highlighting is never captured: while it is active, the pre-highlight
    /// content is recorded instead. Returns true if a snapshot was committed;
    /// a committed snapshot marks the document dirty.
    pub fn capture(&mut self) -> bool {
        self.scheduler.cancel();
        let content = match self.overlay.backup() {
            Some(backup) => Ok(backup.to_string()),
            None => self.surface.formatted_content(),
        };
        let snapshot = match content {
            Ok(content) => Snapshot::new(content, self.surface.selection()),
            Err(e) => {
                tracing::warn!(label = %self.label, "Failed to capture document content: {e:#}");
                return false;
            }
        };

        match self.history.push(snapshot) {
            PushOutcome::Appended { evicted } => {
                tracing::debug!(
                    label = %self.label,
                    entries = self.history.len(),
                    evicted,
                    "captured snapshot"
                );
                self.dirty.mark_dirty();
                self.refresh_highlight();
                true
            }
            PushOutcome::Duplicate | PushOutcome::Paused => false,
        }
    }

    /// Commits whatever is pending so it can be redone after an undo.
    fn flush_pending(&mut self) {
        let changed = self.surface.take_change_notification() && self.history.is_recording();
        if changed && self.overlay.has_backup() {
            self.overlay.invalidate(&mut self.surface);
            self.surface.take_change_notification();
        }
        if changed || self.scheduler.is_armed() {
            self.capture();
        }
    }

    pub fn undo(&mut self) -> UndoOutcome {
        self.step(UndoDirection::Undo)
    }

    pub fn redo(&mut self) -> UndoOutcome {
        self.step(UndoDirection::Redo)
    }

    /// One undo or redo step: snapshot history first, then the surface's
    /// native undo once the history has nothing left in that direction.
    fn step(&mut self, direction: UndoDirection) -> UndoOutcome {
        self.flush_pending();

        let outcome = self.with_recording_paused(|s| {
            if s.overlay.has_backup() {
                s.overlay.clear(&mut s.surface);
            }
            let mut snapshots = SnapshotHistory::new(&mut s.history);
            let mut native = NativeUndo;
            let providers: &mut [&mut dyn UndoProvider<S>] = &mut [&mut snapshots, &mut native];
            undo::run_chain(providers, &mut s.surface, direction)
        });

        if outcome.applied() {
            self.dirty.mark_dirty();
            tracing::debug!(label = %self.label, ?direction, ?outcome, "applied undo step");
        }
        self.refresh_highlight();
        outcome
    }

    /// Repaints the live query's highlight over the current content.
    fn refresh_highlight(&mut self) {
        if self.live_query.is_empty() {
            return;
        }
        self.with_recording_paused(|s| {
            s.overlay.begin(&mut s.surface, &s.live_query);
        });
    }

    /// Highlights every match of `query`. A blank query clears highlighting.
    /// Returns the number of matches.
    pub fn begin_highlight(&mut self, query: &str) -> usize {
        if query.trim().is_empty() {
            self.clear_highlight();
            return 0;
        }
        self.live_query = query.to_string();
        self.with_recording_paused(|s| s.overlay.begin(&mut s.surface, query).len())
    }

    /// Removes highlighting and puts the pre-highlight content back exactly.
    pub fn clear_highlight(&mut self) {
        self.live_query.clear();
        self.with_recording_paused(|s| s.overlay.clear(&mut s.surface));
    }

    /// Updates the live search: highlights the matches of `query` and reports
    /// how many there are.
    pub fn update_search(&mut self, query: &str) -> SearchStatus {
        let matches = self.begin_highlight(query);
        tracing::debug!(label = %self.label, query, matches, "updated search");
        SearchStatus { matches }
    }

    /// Counts matches of `query` without highlighting. A blank query clears
    /// any highlight and counts zero.
    pub fn count_matches(&mut self, query: &str) -> usize {
        if query.trim().is_empty() {
            self.clear_highlight();
            return 0;
        }
        let text = self.surface.plain_text();
        self.search.count(&text, query).unwrap_or_else(|e| {
            tracing::warn!("Search for {query:?} failed: {e:#}");
            0
        })
    }

    /// Selects the first match at or after the end of the selection,
    /// wrapping to the top once. `None` if `query` does not occur.
    pub fn find_next(&mut self, query: &str) -> Option<SearchMatch> {
        let from = self.surface.selection().end();
        let text = self.surface.plain_text();
        let found = self.search.find_next(&text, query, from);
        self.select_match(query, found)
    }

    /// Selects the last match ending at or before the selection, wrapping to the
    /// bottom once. `None` if `query` does not occur.
    pub fn find_previous(&mut self, query: &str) -> Option<SearchMatch> {
        let before = self.surface.selection().start;
        let text = self.surface.plain_text();
        let found = self.search.find_prev(&text, query, before);
        self.select_match(query, found)
    }

    fn select_match(&mut self, query: &str, found: Result<Option<SearchMatch>>) -> Option<SearchMatch> {
        match found {
            Ok(Some(m)) => {
                self.surface.set_selection(m.selection());
                Some(m)
            }
            Ok(None) => {
                tracing::debug!(label = %self.label, query, "no match");
                None
            }
            Err(e) => {
                tracing::warn!("Search for {query:?} failed: {e:#}");
                None
            }
        }
    }

    /// Flags the document as modified without capturing.
    pub fn mark_modified(&mut self) {
        self.dirty.mark_dirty();
    }

    /// Flags the document as saved.
    pub fn mark_saved(&mut self) {
        self.dirty.mark_clean();
    }

    /// Writes the plain text to `path` in the document's on-disk format and
    /// marks the document saved. The label follows the new file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the document stays
    /// dirty.
    pub fn save_plain_text(&mut self, path: &Path) -> Result<()> {
        let text = self.surface.plain_text();
        io::write_text_file(path, &text, self.format)
            .with_context(|| format!("failed to save {}", self.label))?;
        if let Some(name) = path.file_name() {
            self.label = name.to_string_lossy().into_owned();
        }
        self.path = Some(path.to_path_buf());
        self.mark_saved();
        tracing::info!(path = %path.display(), "saved document");
        Ok(())
    }

    /// Saves to the path the document was opened from or last saved to.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no path or cannot be written.
    pub fn save(&mut self) -> Result<()> {
        let path = self
            .path
            .clone()
            .context("document has never been saved")?;
        self.save_plain_text(&path)
    }

    /// Replaces the content with the plain text of a file, as an ordinary
    /// edit: it is captured after the debounce interval and can be undone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load_plain_text(&mut self, now: Instant, path: &Path) -> Result<()> {
        let file = io::read_text_file(path)?;
        self.edit(now, |surface| surface.set_plain_text(&file.text));
        self.format = file.format;
        Ok(())
    }

    /// Stops tracking and hands the surface back.
    ///
    /// A pending capture is dropped, and any highlight is lifted so the
    /// surface is left with its real content.
    pub fn detach(mut self) -> S {
        self.scheduler.cancel();
        if self.overlay.has_backup() {
            self.with_recording_paused(|s| s.overlay.clear(&mut s.surface));
        }
        tracing::debug!(label = %self.label, "detached document");
        self.surface
    }
}

impl<S: EditableSurface + std::fmt::Debug> std::fmt::Debug for DocumentSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSession")
            .field("label", &self.label)
            .field("surface", &self.surface)
            .field("history", &self.history)
            .field("dirty", &self.dirty.is_dirty())
            .field("live_query", &self.live_query)
            .finish_non_exhaustive()
    }
}
