//! In-memory rich text surface.
//!
//! Formatted content is a JSON document holding the text and its background
//! runs. Edits made through the user-facing methods (`type_text`,
//! `delete_backward`, `format_background`) feed the surface's native undo
//! stack; programmatic writes through the [`EditableSurface`] trait do not.

use std::ops::Range;

use anyhow::{Context, Result};
use notebook_pro_config::HexColor;
use serde::{Deserialize, Serialize};

use super::{BackgroundSpan, EditableSurface};
use crate::buffer::TextBuffer;
use crate::history::Selection;

/// How many edits the native undo stack remembers.
const NATIVE_UNDO_LIMIT: usize = 100;

/// Serialized form of a surface's content.
#[derive(Debug, Serialize, Deserialize)]
struct RichContent {
    text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    backgrounds: Vec<BackgroundSpan>,
}

/// State saved on the native undo stack.
#[derive(Debug, Clone)]
struct EditState {
    text: String,
    backgrounds: Vec<BackgroundSpan>,
    selection: Selection,
}

/// A rope-backed surface with background formatting and native undo.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    buffer: TextBuffer,
    /// Sorted, non-overlapping, non-empty runs.
    backgrounds: Vec<BackgroundSpan>,
    selection: Selection,
    changed: bool,
    undo_stack: Vec<EditState>,
    redo_stack: Vec<EditState>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a surface holding `text`, caret at the start, with no pending
    /// change notification.
    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: TextBuffer::from(text),
            ..Self::default()
        }
    }

    pub fn backgrounds(&self) -> &[BackgroundSpan] {
        &self.backgrounds
    }

    /// Replaces the selection with `text` and leaves the caret after it,
    /// the way typing or pasting does.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer rejects the edit.
    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.record_native();
        let sel = self.selection.clamp_to(self.buffer.len_chars());
        self.splice(sel.start, sel.end(), text)?;
        self.selection = Selection::caret(sel.start + text.chars().count());
        Ok(())
    }

    /// Deletes the selection, or the char before the caret. Does nothing at
    /// the start of the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer rejects the edit.
    pub fn delete_backward(&mut self) -> Result<()> {
        let sel = self.selection.clamp_to(self.buffer.len_chars());
        let (start, end) = if sel.len > 0 {
            (sel.start, sel.end())
        } else if sel.start > 0 {
            (sel.start - 1, sel.start)
        } else {
            return Ok(());
        };
        self.record_native();
        self.splice(start, end, "")?;
        self.selection = Selection::caret(start);
        Ok(())
    }

    /// Applies a background as a user formatting command.
    pub fn format_background(&mut self, range: Range<usize>, color: Option<HexColor>) {
        self.record_native();
        self.paint(range, color);
    }

    fn splice(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.buffer
            .replace(start, end, text)
            .context("failed to edit surface text")?;
        self.shift_for_remove(start, end);
        self.shift_for_insert(start, text.chars().count());
        self.changed = true;
        Ok(())
    }

    fn shift_for_insert(&mut self, at: usize, count: usize) {
        if count == 0 {
            return;
        }
        for span in &mut self.backgrounds {
            if span.start >= at {
                span.start += count;
                span.end += count;
            } else if span.end > at {
                // Typing inside a run extends it
                span.end += count;
            }
        }
    }

    fn shift_for_remove(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let removed = end - start;
        let map = |x: usize| {
            if x <= start {
                x
            } else if x <= end {
                start
            } else {
                x - removed
            }
        };
        for span in &mut self.backgrounds {
            span.start = map(span.start);
            span.end = map(span.end);
        }
        self.backgrounds = normalize(std::mem::take(&mut self.backgrounds));
    }

    fn paint(&mut self, range: Range<usize>, color: Option<HexColor>) {
        let len = self.buffer.len_chars();
        let (start, end) = (range.start.min(len), range.end.min(len));
        if start >= end {
            return;
        }

        let mut next = Vec::with_capacity(self.backgrounds.len() + 2);
        for span in &self.backgrounds {
            if span.end <= start || span.start >= end {
                next.push(*span);
                continue;
            }
            if span.start < start {
                next.push(BackgroundSpan {
                    end: start,
                    ..*span
                });
            }
            if span.end > end {
                next.push(BackgroundSpan {
                    start: end,
                    ..*span
                });
            }
        }
        if let Some(color) = color {
            next.push(BackgroundSpan { start, end, color });
        }

        let next = normalize(next);
        if next != self.backgrounds {
            self.backgrounds = next;
            self.changed = true;
        }
    }

    fn state(&self) -> EditState {
        EditState {
            text: self.buffer.to_string(),
            backgrounds: self.backgrounds.clone(),
            selection: self.selection,
        }
    }

    fn apply_state(&mut self, state: EditState) {
        self.buffer.set_text(&state.text);
        self.backgrounds = state.backgrounds;
        self.selection = state.selection.clamp_to(self.buffer.len_chars());
        self.changed = true;
    }

    fn record_native(&mut self) {
        if self.undo_stack.len() == NATIVE_UNDO_LIMIT {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(self.state());
        self.redo_stack.clear();
    }
}

impl EditableSurface for MemorySurface {
    fn formatted_content(&self) -> Result<String> {
        let content = RichContent {
            text: self.buffer.to_string(),
            backgrounds: self.backgrounds.clone(),
        };
        serde_json::to_string(&content).context("failed to serialize surface content")
    }

    fn set_formatted_content(&mut self, content: &str) -> Result<()> {
        if content.is_empty() {
            self.buffer.set_text("");
            self.backgrounds.clear();
            self.selection = Selection::default();
            self.changed = true;
            return Ok(());
        }

        let parsed: RichContent =
            serde_json::from_str(content).context("malformed formatted content")?;
        let text_len = parsed.text.chars().count();
        let backgrounds = validate(parsed.backgrounds, text_len)?;

        self.buffer.set_text(&parsed.text);
        self.backgrounds = backgrounds;
        self.selection = self.selection.clamp_to(text_len);
        self.changed = true;
        Ok(())
    }

    fn plain_text(&self) -> String {
        self.buffer.to_string()
    }

    fn set_plain_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.backgrounds.clear();
        self.selection = self.selection.clamp_to(self.buffer.len_chars());
        self.changed = true;
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp_to(self.buffer.len_chars());
    }

    fn paint_background(&mut self, range: Range<usize>, color: Option<HexColor>) {
        self.paint(range, color);
    }

    fn take_change_notification(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn native_undo(&mut self) -> bool {
        let Some(state) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.state());
        self.apply_state(state);
        true
    }

    fn native_redo(&mut self) -> bool {
        let Some(state) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.state());
        self.apply_state(state);
        true
    }

    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }
}

/// Sorts runs, drops empty ones and merges touching runs of the same color.
fn normalize(mut spans: Vec<BackgroundSpan>) -> Vec<BackgroundSpan> {
    spans.retain(|s| s.start < s.end);
    spans.sort_by_key(|s| s.start);
    let mut merged: Vec<BackgroundSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if last.end == span.start && last.color == span.color => {
                last.end = span.end;
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Checks runs read from a blob against the text they format.
fn validate(spans: Vec<BackgroundSpan>, text_len: usize) -> Result<Vec<BackgroundSpan>> {
    for span in &spans {
        if span.start >= span.end || span.end > text_len {
            anyhow::bail!(
                "background run {}..{} invalid for {} chars of text",
                span.start,
                span.end,
                text_len
            );
        }
    }
    let spans = normalize(spans);
    if spans.windows(2).any(|w| w[0].end > w[1].start) {
        anyhow::bail!("overlapping background runs");
    }
    Ok(spans)
}
