/// Plain-text storage for a surface, backed by `ropey::Rope`.
///
/// All offsets are char indices, matching the selection model.
use std::fmt;

use anyhow::Result;
use ropey::Rope;

/// A text buffer backed by a rope data structure for efficient editing.
#[derive(Debug, Clone, Default)]
pub struct TextBuffer {
    rope: Rope,
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rope)
    }
}

impl TextBuffer {
    /// Creates an empty text buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Replaces the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Replaces the chars in `start..end` with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is inverted or out of bounds.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<()> {
        self.check_range(start, end)?;
        self.rope.remove(start..end);
        self.rope.insert(start, text);
        Ok(())
    }

    fn check_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end || end > self.rope.len_chars() {
            anyhow::bail!(
                "range {}..{} out of bounds (buffer has {} chars)",
                start,
                end,
                self.rope.len_chars()
            );
        }
        Ok(())
    }
}
