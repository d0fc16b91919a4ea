/// Search highlighting that can be removed without a trace.
///
/// The first highlight of a search session backs up the surface's formatted
/// content. Every later highlight starts from that backup, so repainting for a
/// new query never stacks on old highlight runs, and clearing writes the
/// backup back verbatim. The backup never enters the undo history.
use notebook_pro_config::HexColor;

use super::finder::{SearchEngine, SearchMatch};
use crate::surface::EditableSurface;

#[derive(Debug)]
pub struct HighlightOverlay {
    /// Pre-highlight formatted content, present while highlighting is active.
    backup: Option<String>,
    color: HexColor,
    engine: SearchEngine,
}

impl HighlightOverlay {
    pub fn new(color: HexColor) -> Self {
        Self {
            backup: None,
            color,
            engine: SearchEngine::new(),
        }
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_some()
    }

    /// The content the document had before highlighting started.
    pub fn backup(&self) -> Option<&str> {
        self.backup.as_deref()
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    /// Highlights every match of `query` and returns the matches. An empty
    /// query clears highlighting instead.
    ///
    /// The selection is preserved.
    pub fn begin<S: EditableSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        query: &str,
    ) -> Vec<SearchMatch> {
        if query.is_empty() {
            self.clear(surface);
            return Vec::new();
        }

        if self.backup.is_none() {
            match surface.formatted_content() {
                Ok(content) => self.backup = Some(content),
                Err(e) => tracing::warn!("Failed to back up content before highlighting: {e:#}"),
            }
        }

        let selection = surface.selection();
        self.restore_backup_or_strip(surface);

        let text = surface.plain_text();
        let matches = match self.engine.find_all(&text, query) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Search for {query:?} failed: {e:#}");
                Vec::new()
            }
        };
        for m in &matches {
            surface.paint_background(m.start..m.end, Some(self.color));
        }

        surface.set_selection(selection.clamp_to(surface.len_chars()));
        tracing::debug!(query, matches = matches.len(), "highlighted matches");
        matches
    }

    /// Removes highlighting: writes the backup back if there is one,
    /// otherwise clears all background formatting. The selection is kept.
    pub fn clear<S: EditableSurface + ?Sized>(&mut self, surface: &mut S) {
        let selection = surface.selection();
        self.restore_backup_or_strip(surface);
        self.backup = None;
        surface.set_selection(selection.clamp_to(surface.len_chars()));
    }

    /// Forgets a backup the document has moved away from.
    ///
    /// Background formatting is cleared since it can no longer be told
    /// apart from the highlight runs it carries.
    pub fn invalidate<S: EditableSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.backup.take().is_some() {
            tracing::debug!("highlight backup went stale, clearing backgrounds");
            surface.clear_backgrounds();
        }
    }

    /// Drops the backup without touching the surface, for when the surface
    /// content was replaced wholesale.
    pub fn discard(&mut self) {
        self.backup = None;
    }

    fn restore_backup_or_strip<S: EditableSurface + ?Sized>(&self, surface: &mut S) {
        match &self.backup {
            Some(backup) => {
                if let Err(e) = surface.set_formatted_content(backup) {
                    tracing::warn!("Failed to restore pre-highlight content: {e:#}");
                    surface.clear_backgrounds();
                }
            }
            None => surface.clear_backgrounds(),
        }
    }
}
