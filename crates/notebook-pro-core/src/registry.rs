/// Registry of open document sessions, in tab order.
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use notebook_pro_config::NotebookConfig;

use crate::session::DocumentSession;
use crate::surface::EditableSurface;

/// Identifies a session for as long as it is open. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Documents with unsaved changes, as listed when closing the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsavedSummary {
    labels: Vec<String>,
    preview_limit: usize,
}

impl UnsavedSummary {
    pub const TITLE: &'static str = "Unsaved Work";
    pub const MESSAGE: &'static str = "You have unsaved changes. Leaving now will discard any \
        progress that hasn't been saved. Do you want to leave?";

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

impl std::fmt::Display for UnsavedSummary {
    /// The first few labels, then a count of the rest:
    /// `a, b, c, d, e ... (+2 more)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.labels.len().min(self.preview_limit);
        write!(f, "{}", self.labels[..shown].join(", "))?;
        if self.labels.len() > shown {
            write!(f, " ... (+{} more)", self.labels.len() - shown)?;
        }
        Ok(())
    }
}

/// Owns every open [`DocumentSession`], keyed by [`DocumentId`].
pub struct SessionRegistry<S: EditableSurface> {
    sessions: Vec<(DocumentId, DocumentSession<S>)>,
    next_id: u64,
    /// Highest "Untitled" number handed out so far.
    untitled_count: usize,
    config: NotebookConfig,
}

impl<S: EditableSurface> SessionRegistry<S> {
    pub fn new(config: NotebookConfig) -> Self {
        Self {
            sessions: Vec::new(),
            next_id: 1,
            untitled_count: 0,
            config,
        }
    }

    pub fn config(&self) -> &NotebookConfig {
        &self.config
    }

    fn insert(&mut self, session: DocumentSession<S>) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        tracing::info!(%id, label = session.label(), "opened document");
        self.sessions.push((id, session));
        id
    }

    /// Starts a session for `surface` under `label`.
    pub fn open(&mut self, label: impl Into<String>, surface: S) -> DocumentId {
        let session = DocumentSession::attach(label, surface, &self.config);
        self.insert(session)
    }

    /// Starts a session under the next untitled label ("Untitled",
    /// "Untitled 2", ...). Numbers of closed tabs are not handed out again.
    pub fn open_untitled(&mut self, surface: S) -> DocumentId {
        let label = self.next_untitled_label();
        self.open(label, surface)
    }

    /// Loads a plain-text file into `surface` and starts a session for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn open_file(&mut self, path: &Path, surface: S) -> Result<DocumentId> {
        let session = DocumentSession::open_file(path, surface, &self.config)?;
        Ok(self.insert(session))
    }

    fn next_untitled_label(&mut self) -> String {
        self.untitled_count += 1;
        let prefix = &self.config.untitled_prefix;
        if self.untitled_count == 1 {
            prefix.clone()
        } else {
            format!("{prefix} {}", self.untitled_count)
        }
    }

    pub fn get(&self, id: DocumentId) -> Option<&DocumentSession<S>> {
        self.sessions
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, session)| session)
    }

    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut DocumentSession<S>> {
        self.sessions
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, session)| session)
    }

    /// Closes a session, cancelling its pending capture, and returns its
    /// surface. `None` if `id` is not open.
    pub fn close(&mut self, id: DocumentId) -> Option<S> {
        let idx = self.sessions.iter().position(|(sid, _)| *sid == id)?;
        let (_, session) = self.sessions.remove(idx);
        tracing::info!(%id, label = session.label(), "closed document");
        Some(session.detach())
    }

    /// Open documents in tab order.
    pub fn ids(&self) -> Vec<DocumentId> {
        self.sessions.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &DocumentSession<S>)> {
        self.sessions.iter().map(|(id, session)| (*id, session))
    }

    /// Picks up pending surface changes in every session.
    pub fn poll_all(&mut self, now: Instant) {
        for (_, session) in &mut self.sessions {
            session.poll_changes(now);
        }
    }

    /// Drives every session's capture scheduler. Returns how many snapshots
    /// were committed.
    pub fn tick_all(&mut self, now: Instant) -> usize {
        self.sessions
            .iter_mut()
            .map(|(_, session)| session.tick(now))
            .filter(|committed| *committed)
            .count()
    }

    /// Earliest pending capture across all sessions.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.sessions
            .iter()
            .filter_map(|(_, session)| session.next_deadline())
            .min()
    }

    pub fn dirty_documents(&self) -> Vec<DocumentId> {
        self.sessions
            .iter()
            .filter(|(_, session)| session.is_dirty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn unsaved_summary(&self) -> UnsavedSummary {
        UnsavedSummary {
            labels: self
                .sessions
                .iter()
                .filter(|(_, session)| session.is_dirty())
                .map(|(_, session)| session.label().to_string())
                .collect(),
            preview_limit: self.config.unsaved_preview_limit,
        }
    }

    /// Whether the application may close. With unsaved documents, `confirm`
    /// decides; returning false cancels the close.
    pub fn request_close(&self, confirm: impl FnOnce(&UnsavedSummary) -> bool) -> bool {
        let summary = self.unsaved_summary();
        if summary.is_empty() {
            return true;
        }
        let leave = confirm(&summary);
        if !leave {
            tracing::info!(unsaved = summary.len(), "close cancelled");
        }
        leave
    }
}

impl<S: EditableSurface> Default for SessionRegistry<S> {
    fn default() -> Self {
        Self::new(NotebookConfig::default())
    }
}
