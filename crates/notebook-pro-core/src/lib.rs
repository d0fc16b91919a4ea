//! Per-document snapshot history for a tabbed rich text editor.
//!
//! Each open document gets a [`DocumentSession`] that records debounced
//! snapshots of its [`EditableSurface`], answers undo/redo from that history
//! (falling back to the surface's own undo), tracks unsaved changes and
//! paints search highlights that never leak into the history.

pub mod buffer;
pub mod dirty;
pub mod history;
pub mod io;
pub mod registry;
pub mod scheduler;
pub mod search;
pub mod session;
pub mod surface;

pub use dirty::DirtyTracker;
pub use history::{HistoryConfig, HistoryStore, PushOutcome, Selection, Snapshot};
pub use registry::{DocumentId, SessionRegistry, UnsavedSummary};
pub use scheduler::CaptureScheduler;
pub use search::{HighlightOverlay, SearchEngine, SearchMatch};
pub use session::{DocumentSession, SearchStatus, UndoDirection, UndoOutcome};
pub use surface::{BackgroundSpan, EditableSurface, MemorySurface};
