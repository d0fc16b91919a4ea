//! Replays scripted editor events against a session registry.
//!
//! A script is a JSON document `{"steps": [...]}` where each step is tagged
//! by `op`, e.g. `{"op": "type", "text": "hello"}` or `{"op": "wait",
//! "ms": 500}`. Time is virtual: `wait` advances the clock and fires every
//! capture that falls due on the way.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use notebook_pro_config::NotebookConfig;
use notebook_pro_core::{
    DocumentId, EditableSurface, MemorySurface, Selection, SessionRegistry, UnsavedSummary,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// New tab, untitled unless a label is given.
    Open {
        label: Option<String>,
        #[serde(default)]
        text: String,
    },
    OpenFile { path: PathBuf },
    /// Makes the n-th open tab (0-based) active.
    Switch { tab: usize },
    Select {
        start: usize,
        #[serde(default)]
        len: usize,
    },
    Type { text: String },
    Backspace {
        #[serde(default = "one")]
        count: usize,
    },
    Wait { ms: u64 },
    Undo,
    Redo,
    Search { query: String },
    ClearSearch,
    FindNext { query: String },
    FindPrev { query: String },
    /// Saves to `path`, or to the file the tab came from.
    Save { path: Option<PathBuf> },
    /// Replaces the active tab's text with a file's content.
    Load { path: PathBuf },
    Close,
    /// Asks to quit; `confirm` answers the unsaved-changes prompt.
    Exit {
        #[serde(default)]
        confirm: bool,
    },
}

fn one() -> usize {
    1
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::OpenFile { .. } => "open_file",
            Self::Switch { .. } => "switch",
            Self::Select { .. } => "select",
            Self::Type { .. } => "type",
            Self::Backspace { .. } => "backspace",
            Self::Wait { .. } => "wait",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::Search { .. } => "search",
            Self::ClearSearch => "clear_search",
            Self::FindNext { .. } => "find_next",
            Self::FindPrev { .. } => "find_prev",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
            Self::Close => "close",
            Self::Exit { .. } => "exit",
        }
    }
}

/// Something worth reporting that a step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub step: usize,
    pub op: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    pub label: String,
    pub text: String,
    pub dirty: bool,
    pub history_len: usize,
    pub history_position: Option<usize>,
    pub highlighting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub events: Vec<Event>,
    pub documents: Vec<DocumentReport>,
    /// Whether an `exit` step was allowed through.
    pub exited: bool,
    pub elapsed_ms: u128,
}

pub struct ScriptRunner {
    registry: SessionRegistry<MemorySurface>,
    active: Option<DocumentId>,
    start: Instant,
    now: Instant,
    events: Vec<Event>,
    exited: bool,
}

impl ScriptRunner {
    pub fn new(config: NotebookConfig) -> Self {
        let start = Instant::now();
        Self {
            registry: SessionRegistry::new(config),
            active: None,
            start,
            now: start,
            events: Vec::new(),
            exited: false,
        }
    }

    /// Runs every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error naming the step that failed.
    pub fn run(mut self, script: &Script) -> Result<Report> {
        for (index, step) in script.steps.iter().enumerate() {
            tracing::debug!(index, op = step.name(), "running step");
            if let Some(detail) = self
                .apply(step)
                .with_context(|| format!("step {index} ({}) failed", step.name()))?
            {
                self.events.push(Event {
                    step: index,
                    op: step.name(),
                    detail,
                });
            }
            if self.exited {
                break;
            }
        }
        Ok(self.report())
    }

    fn active_id(&self) -> Result<DocumentId> {
        self.active.context("no document is open")
    }

    fn apply(&mut self, step: &Step) -> Result<Option<String>> {
        let now = self.now;
        let detail = match step {
            Step::Open { label, text } => {
                let surface = MemorySurface::from_text(text);
                let id = match label {
                    Some(label) => self.registry.open(label.clone(), surface),
                    None => self.registry.open_untitled(surface),
                };
                self.active = Some(id);
                None
            }
            Step::OpenFile { path } => {
                let id = self.registry.open_file(path, MemorySurface::new())?;
                self.active = Some(id);
                None
            }
            Step::Switch { tab } => {
                let ids = self.registry.ids();
                match ids.get(*tab) {
                    Some(id) => self.active = Some(*id),
                    None => bail!("there is no tab {tab}, {} open", ids.len()),
                }
                None
            }
            Step::Select { start, len } => {
                let doc = self.session()?;
                doc.surface_mut().set_selection(Selection::new(*start, *len));
                None
            }
            Step::Type { text } => {
                self.session()?.edit(now, |s| s.type_text(text))?;
                None
            }
            Step::Backspace { count } => {
                self.session()?.edit(now, |s| {
                    (0..*count).try_for_each(|_| s.delete_backward())
                })?;
                None
            }
            Step::Wait { ms } => {
                let committed = self.advance(Duration::from_millis(*ms));
                (committed > 0).then(|| format!("{committed} snapshot(s) captured"))
            }
            Step::Undo => Some(format!("{:?}", self.session()?.undo())),
            Step::Redo => Some(format!("{:?}", self.session()?.redo())),
            Step::Search { query } => Some(self.session()?.update_search(query).to_string()),
            Step::ClearSearch => {
                self.session()?.clear_highlight();
                None
            }
            Step::FindNext { query } => Some(found(query, self.session()?.find_next(query))),
            Step::FindPrev { query } => Some(found(query, self.session()?.find_previous(query))),
            Step::Save { path } => {
                let doc = self.session()?;
                match path {
                    Some(path) => doc.save_plain_text(path)?,
                    None => doc.save()?,
                }
                Some(format!("saved {}", doc.label()))
            }
            Step::Load { path } => {
                self.session()?.load_plain_text(now, path)?;
                None
            }
            Step::Close => {
                let id = self.active_id()?;
                self.registry.close(id);
                self.active = self.registry.ids().last().copied();
                None
            }
            Step::Exit { confirm } => {
                let mut prompt: Option<String> = None;
                self.exited = self.registry.request_close(|summary: &UnsavedSummary| {
                    prompt = Some(format!("{} ({summary})", UnsavedSummary::MESSAGE));
                    *confirm
                });
                prompt
            }
        };
        Ok(detail)
    }

    fn session(&mut self) -> Result<&mut notebook_pro_core::DocumentSession<MemorySurface>> {
        let id = self.active_id()?;
        self.registry
            .get_mut(id)
            .with_context(|| format!("document {id} is not open"))
    }

    /// Moves the virtual clock forward, firing each capture at its deadline.
    fn advance(&mut self, by: Duration) -> usize {
        let target = self.now + by;
        let mut committed = 0;
        while let Some(deadline) = self.registry.next_deadline().filter(|d| *d <= target) {
            self.now = self.now.max(deadline);
            committed += self.registry.tick_all(self.now);
        }
        self.now = target;
        committed + self.registry.tick_all(self.now)
    }

    fn report(&self) -> Report {
        let documents = self
            .registry
            .iter()
            .map(|(_, doc)| DocumentReport {
                label: doc.display_label(),
                text: doc.surface().plain_text(),
                dirty: doc.is_dirty(),
                history_len: doc.history().len(),
                history_position: doc.history().position(),
                highlighting: doc.is_highlighting(),
            })
            .collect();
        Report {
            events: self.events.clone(),
            documents,
            exited: self.exited,
            elapsed_ms: (self.now - self.start).as_millis(),
        }
    }
}

fn found(query: &str, m: Option<notebook_pro_core::SearchMatch>) -> String {
    match m {
        Some(m) => format!("found at {}..{}", m.start, m.end),
        None => format!("'{query}' not found."),
    }
}
