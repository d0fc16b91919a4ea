// Re-exports from notebook-pro-mod-history and helpers that tie snapshots to
// editable surfaces.
pub use notebook_pro_mod_history::{
    HistoryConfig, HistoryStore, PushOutcome, Selection, Snapshot,
};

use crate::surface::EditableSurface;

/// Captures the surface's current formatted content and selection.
///
/// Returns `None` (after logging) when the surface cannot serialize itself.
pub fn capture<S: EditableSurface + ?Sized>(surface: &S) -> Option<Snapshot> {
    match surface.formatted_content() {
        Ok(content) => Some(Snapshot::new(content, surface.selection())),
        Err(e) => {
            tracing::warn!("Failed to capture document content: {e:#}");
            None
        }
    }
}

/// Writes a snapshot back into the surface.
///
/// A blob the surface rejects leaves the text in place and only clears
/// background formatting. The selection is clamped to the resulting text.
pub fn restore<S: EditableSurface + ?Sized>(surface: &mut S, snapshot: &Snapshot) {
    if let Err(e) = surface.set_formatted_content(snapshot.content()) {
        tracing::warn!("Failed to restore snapshot, clearing formatting instead: {e:#}");
        surface.clear_backgrounds();
    }
    let len = surface.len_chars();
    surface.set_selection(snapshot.selection().clamp_to(len));
}
