//! Text edits and their application.

use serde::{Deserialize, Serialize};

use crate::error::{FmtError, Result};
use crate::syntax::TextSpan;

/// Replace `span` with `replacement`. Empty span inserts, empty replacement
/// deletes.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TextEdit {
    pub span: TextSpan,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: TextSpan, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::replace(TextSpan::empty(offset), text)
    }

    #[must_use]
    pub fn delete(span: TextSpan) -> Self {
        Self::replace(span, String::new())
    }
}

/// Apply `edits` to `text`.
///
/// Edits may arrive in any order. Overlapping edits, spans past the end of
/// `text` and spans splitting a UTF-8 character are errors.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.span.start, e.span.end));

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for edit in ordered {
        let span = TextSpan::checked(edit.span.start, edit.span.end, text.len())?;
        if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
            return Err(FmtError::InvalidSpan {
                start: span.start,
                end: span.end,
                len: text.len(),
            });
        }
        if span.start < cursor {
            return Err(FmtError::OverlappingEdits {
                first_end: cursor,
                second_start: span.start,
            });
        }
        out.push_str(&text[cursor..span.start]);
        out.push_str(&edit.replacement);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_out_of_order_edits() {
        let text = "if(x) while(y)";
        let edits = vec![TextEdit::insert(11, " "), TextEdit::insert(2, " ")];
        assert_eq!(apply_edits(text, &edits).unwrap(), "if (x) while (y)");
    }

    #[test]
    fn replace_and_delete() {
        let text = "abc   \ndef";
        let edits = vec![
            TextEdit::delete(TextSpan::new(3, 6)),
            TextEdit::replace(TextSpan::new(7, 10), "xyz"),
        ];
        assert_eq!(apply_edits(text, &edits).unwrap(), "abc\nxyz");
    }

    #[test]
    fn overlapping_edits_fail() {
        let edits = vec![
            TextEdit::replace(TextSpan::new(0, 4), "a"),
            TextEdit::replace(TextSpan::new(2, 5), "b"),
        ];
        assert!(matches!(
            apply_edits("0123456", &edits),
            Err(FmtError::OverlappingEdits { .. })
        ));
    }

    #[test]
    fn out_of_range_and_split_chars_fail() {
        assert!(apply_edits("abc", &[TextEdit::insert(4, "x")]).is_err());
        assert!(apply_edits("é", &[TextEdit::insert(1, "x")]).is_err());
    }

    #[test]
    fn no_edits_is_identity() {
        assert_eq!(apply_edits("same", &[]).unwrap(), "same");
    }
}
