//! Source locations.
//!
//! `Span` is a half-open byte range inside one compilation unit. Diagnostics
//! carry a `SourceSpan`, which adds the file name so the tree can be rendered
//! without access to the module table.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Self = Self { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub const fn is_dummy(self) -> bool {
        self.start == 0 && self.end == 0
    }

    /// Whether `offset` falls inside this span. The end offset counts as
    /// inside so a cursor placed right after an identifier still hits it.
    #[inline]
    pub const fn contains(self, offset: u32) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Whether `other` lies completely within this span.
    #[inline]
    pub const fn encloses(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn to(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A span qualified with the file it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: String,
    pub start: u32,
    pub end: u32,
}

impl SourceSpan {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            start: span.start,
            end: span.end,
        }
    }
}

/// Line start table for a source text.
#[derive(Clone, Debug, Default)]
pub struct LineMap {
    line_starts: Vec<u32>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// Zero-based line index containing `offset`.
    pub fn line_of(&self, offset: u32) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Text of the line containing `offset`, without its line terminator.
    pub fn line_text<'t>(&self, text: &'t str, offset: u32) -> &'t str {
        let line = self.line_of(offset);
        let start = self.line_starts[line] as usize;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(text.len(), |&next| next as usize);
        let start = start.min(text.len());
        let end = end.min(text.len()).max(start);
        text.get(start..end)
            .unwrap_or("")
            .trim_end_matches(|c: char| c == '\n' || c == '\r')
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
#[path = "../tests/span_tests.rs"]
mod tests;
