/// Case-insensitive literal search over a document's plain text.
///
/// Matches are found left to right and never overlap: scanning resumes right
/// after each match, so "aaaa" holds two matches of "aa", not three.
use anyhow::{Context, Result};
use regex::Regex;

use crate::history::Selection;

/// A single search match, in char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// Start char index.
    pub start: usize,
    /// End char index (exclusive).
    pub end: usize,
}

impl SearchMatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The selection that covers this match.
    pub fn selection(&self) -> Selection {
        Selection::new(self.start, self.len())
    }
}

/// The search engine. Caches the compiled pattern for the last query.
#[derive(Debug, Default)]
pub struct SearchEngine {
    compiled: Option<(String, Regex)>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_pattern(query: &str) -> Result<Regex> {
        Regex::new(&format!("(?i){}", regex::escape(query))).context("invalid search pattern")
    }

    fn pattern(&mut self, query: &str) -> Result<&Regex> {
        let stale = self.compiled.as_ref().map_or(true, |(q, _)| q != query);
        if stale {
            self.compiled = Some((query.to_string(), Self::build_pattern(query)?));
        }
        self.compiled
            .as_ref()
            .map(|(_, regex)| regex)
            .context("search pattern missing after compile")
    }

    /// Finds every match of `query` in `text`. An empty query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be compiled (e.g. it exceeds the
    /// regex size limit).
    pub fn find_all(&mut self, text: &str, query: &str) -> Result<Vec<SearchMatch>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let regex = self.pattern(query)?;

        // Convert byte offsets to char offsets incrementally; matches are ordered
        let mut matches = Vec::new();
        let (mut last_byte, mut last_char) = (0usize, 0usize);
        for mat in regex.find_iter(text) {
            if mat.start() == mat.end() {
                continue;
            }
            let start = last_char + text[last_byte..mat.start()].chars().count();
            let end = start + mat.as_str().chars().count();
            matches.push(SearchMatch { start, end });
            last_byte = mat.end();
            last_char = end;
        }
        Ok(matches)
    }

    /// Number of matches of `query` in `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be compiled.
    pub fn count(&mut self, text: &str, query: &str) -> Result<usize> {
        Ok(self.find_all(text, query)?.len())
    }

    /// First match starting at or after char offset `from`, otherwise the
    /// first match of the document (one lap). `None` if the query does not
    /// occur.
    ///
    /// Unlike [`SearchEngine::find_all`], this may return a match that
    /// overlaps an earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be compiled.
    pub fn find_next(&mut self, text: &str, query: &str, from: usize) -> Result<Option<SearchMatch>> {
        if query.is_empty() {
            return Ok(None);
        }
        let regex = self.pattern(query)?;
        let found = regex
            .find_at(text, byte_offset(text, from))
            .or_else(|| regex.find(text))
            .filter(|m| m.start() < m.end());
        Ok(found.map(|m| to_chars(text, m.start(), m.end())))
    }

    /// Last match lying entirely before char offset `before`, otherwise the
    /// last match of the document (one lap). `None` if the query does not
    /// occur.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be compiled.
    pub fn find_prev(
        &mut self,
        text: &str,
        query: &str,
        before: usize,
    ) -> Result<Option<SearchMatch>> {
        if query.is_empty() {
            return Ok(None);
        }
        let regex = self.pattern(query)?;
        let found = last_match(regex, &text[..byte_offset(text, before)])
            .or_else(|| last_match(regex, text));
        Ok(found.map(|(start, end)| to_chars(text, start, end)))
    }
}

/// Byte index of char offset `chars`, clamped to the end of `text`.
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

fn to_chars(text: &str, start: usize, end: usize) -> SearchMatch {
    let start_char = text[..start].chars().count();
    SearchMatch {
        start: start_char,
        end: start_char + text[start..end].chars().count(),
    }
}

/// Byte range of the last match in `hay`, overlapping ones included.
fn last_match(regex: &Regex, hay: &str) -> Option<(usize, usize)> {
    let mut last = None;
    let mut pos = 0;
    while let Some(m) = regex.find_at(hay, pos) {
        if m.start() == m.end() {
            break;
        }
        last = Some((m.start(), m.end()));
        pos = m.start() + hay[m.start()..].chars().next().map_or(1, char::len_utf8);
    }
    last
}
