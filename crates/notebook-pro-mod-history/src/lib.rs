/// Snapshot-based undo/redo history.
///
/// Provides a `HistoryStore` that keeps a bounded, linear list of formatted
/// document snapshots per open document. History lives in memory only and is
/// dropped with the document.
pub mod config;
pub mod snapshot;
pub mod store;

pub use config::HistoryConfig;
pub use snapshot::{Selection, Snapshot};
pub use store::{HistoryStore, PushOutcome};
