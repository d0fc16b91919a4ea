//! The editable text surface a document session drives.
//!
//! A surface is whatever widget holds the document: it exposes its rich
//! content as an opaque blob, its plain text, its selection, a change
//! notification and, optionally, its own native undo stack. `MemorySurface`
//! is the in-process implementation used by the driver and the tests.

mod memory;

use std::ops::Range;

use anyhow::Result;
use notebook_pro_config::HexColor;
use serde::{Deserialize, Serialize};

use crate::history::Selection;

pub use memory::MemorySurface;

/// A run of chars painted with a background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundSpan {
    /// First char of the run.
    pub start: usize,
    /// One past the last char of the run.
    pub end: usize,
    pub color: HexColor,
}

/// Contract between a document session and the widget it edits.
///
/// All offsets are char indices into [`EditableSurface::plain_text`].
pub trait EditableSurface {
    /// Serializes the full formatted content.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot serialize its state.
    fn formatted_content(&self) -> Result<String>;

    /// Replaces the full formatted content from a blob previously returned by
    /// [`EditableSurface::formatted_content`]. An empty blob clears the
    /// document.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the surface unchanged, if the blob is
    /// malformed.
    fn set_formatted_content(&mut self, content: &str) -> Result<()>;

    fn plain_text(&self) -> String;

    /// Replaces the text, dropping all formatting.
    fn set_plain_text(&mut self, text: &str);

    fn selection(&self) -> Selection;

    /// Moves the selection. Not a content change.
    fn set_selection(&mut self, selection: Selection);

    /// Paints `range` with `color`, or with the default background for `None`.
    fn paint_background(&mut self, range: Range<usize>, color: Option<HexColor>);

    /// Returns whether the content changed since the last call, and resets
    /// the notification.
    fn take_change_notification(&mut self) -> bool;

    /// Reverts the widget's own last edit. Returns false if it has none.
    fn native_undo(&mut self) -> bool {
        false
    }

    /// Re-applies the widget's own last reverted edit. Returns false if it
    /// has none.
    fn native_redo(&mut self) -> bool {
        false
    }

    fn len_chars(&self) -> usize {
        self.plain_text().chars().count()
    }

    /// Resets the background over the whole text, keeping the selection.
    fn clear_backgrounds(&mut self) {
        let selection = self.selection();
        let len = self.len_chars();
        self.paint_background(0..len, None);
        self.set_selection(selection.clamp_to(len));
    }
}
