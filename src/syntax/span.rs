//! Text spans and line/column mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FmtError, Result};

/// Half-open byte range `[start, end)` into a document's text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Create a span. `start` must not exceed `end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Create a span, validating it against a text of length `len`.
    pub fn checked(start: usize, end: usize, len: usize) -> Result<Self> {
        if start > end || end > len {
            return Err(FmtError::InvalidSpan { start, end, len });
        }
        Ok(Self { start, end })
    }

    /// Empty span at `offset`.
    #[must_use]
    pub const fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Span from the start of `first` to the end of `last`.
    #[must_use]
    pub fn cover(first: Self, last: Self) -> Self {
        Self::new(first.start.min(last.start), first.end.max(last.end))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    #[must_use]
    pub const fn contains_span(&self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Slice `text` by this span.
    #[must_use]
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct LinePosition {
    pub line: usize,
    pub column: usize,
}

/// A line/column range, used only for reporting.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: LinePosition,
    pub end: LinePosition,
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line, self.start.column, self.end.column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1));
        Self {
            line_starts,
            len: text.len(),
        }
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`; offsets past the end clamp to the end.
    #[must_use]
    pub fn position(&self, offset: usize) -> LinePosition {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        LinePosition {
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    #[must_use]
    pub fn line_span(&self, span: TextSpan) -> LineSpan {
        LineSpan {
            start: self.position(span.start),
            end: self.position(span.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_rejects_out_of_range() {
        assert!(TextSpan::checked(0, 5, 5).is_ok());
        assert!(matches!(
            TextSpan::checked(2, 6, 5),
            Err(FmtError::InvalidSpan { .. })
        ));
        assert!(TextSpan::checked(3, 2, 5).is_err());
    }

    #[test]
    fn cover_spans_both() {
        let span = TextSpan::cover(TextSpan::new(4, 10), TextSpan::new(12, 20));
        assert_eq!(span, TextSpan::new(4, 20));
        assert_eq!(span.len(), 16);
        assert!(span.contains(4));
        assert!(!span.contains(20));
    }

    #[test]
    fn line_index_positions() {
        let text = "ab\ncde\n\nf";
        let index = LineIndex::new(text);
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.position(0), LinePosition { line: 1, column: 1 });
        assert_eq!(index.position(3), LinePosition { line: 2, column: 1 });
        assert_eq!(index.position(5), LinePosition { line: 2, column: 3 });
        assert_eq!(index.position(7), LinePosition { line: 3, column: 1 });
        assert_eq!(index.position(99), LinePosition { line: 4, column: 2 });
    }

    #[test]
    fn line_span_display() {
        let index = LineIndex::new("using A;\nusing B;\n");
        assert_eq!(index.line_span(TextSpan::new(0, 8)).to_string(), "1:1-9");
        assert_eq!(index.line_span(TextSpan::new(0, 17)).to_string(), "1:1-2:9");
    }
}
