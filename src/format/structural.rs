//! Token-level whitespace formatter.

use tracing::trace;

use crate::error::{FmtError, Result};
use crate::syntax::TextSpan;
use crate::syntax::lexer::{Token, TokenKind, tokenize};
use crate::workspace::Document;

use super::edit::TextEdit;
use super::{FormatOptions, Formatter};

/// Keywords whose parenthesised clause takes a separating space.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "fixed",
];

/// Applies the whitespace options in [`FormatOptions`]. Everything else about
/// the layout is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralFormatter;

impl Formatter for StructuralFormatter {
    fn compute_edits(&self, document: &Document, options: &FormatOptions) -> Result<Vec<TextEdit>> {
        // Formatting needs a well-formed document, same as analysis.
        document.syntax_root()?;
        let text = document.text();
        let tokens = tokenize(text).map_err(|err| FmtError::TreeUnavailable {
            document: document.id(),
            reason: err.message,
        })?;

        let mut edits = Vec::new();
        control_keyword_edits(text, &tokens, options.space_after_control_keyword, &mut edits);
        if options.trim_trailing_whitespace {
            trailing_whitespace_edits(text, &tokens, &mut edits);
        }
        if options.insert_final_newline && !text.is_empty() && !text.ends_with('\n') {
            let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
            edits.push(TextEdit::insert(text.len(), newline));
        }

        edits.sort_by_key(|e| (e.span.start, e.span.end));
        trace!(document = %document.id(), edits = edits.len(), "computed format edits");
        Ok(edits)
    }
}

fn control_keyword_edits(text: &str, tokens: &[Token], want_space: bool, edits: &mut Vec<TextEdit>) {
    for pair in tokens.windows(2) {
        let (keyword, next) = (pair[0], pair[1]);
        if keyword.kind != TokenKind::Ident
            || !next.is_punct(b'(')
            || !CONTROL_KEYWORDS.contains(&keyword.text(text))
        {
            continue;
        }
        let gap = TextSpan::new(keyword.span.end, next.span.start);
        let gap_text = gap.slice(text);
        if want_space && gap_text.is_empty() {
            edits.push(TextEdit::insert(gap.start, " "));
        } else if !want_space
            && !gap_text.is_empty()
            && gap_text.bytes().all(|b| b == b' ' || b == b'\t')
        {
            edits.push(TextEdit::delete(gap));
        }
    }
}

fn trailing_whitespace_edits(text: &str, tokens: &[Token], edits: &mut Vec<TextEdit>) {
    let strings: Vec<TextSpan> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::String)
        .map(|t| t.span)
        .collect();
    let in_string = |offset: usize| {
        let idx = strings.partition_point(|s| s.end <= offset);
        strings.get(idx).is_some_and(|s| s.contains(offset))
    };

    let bytes = text.as_bytes();
    let mut line_start = 0usize;
    while line_start <= bytes.len() {
        let line_end = memchr::memchr(b'\n', &bytes[line_start..])
            .map_or(bytes.len(), |i| line_start + i);
        let content_end = if line_end > line_start && bytes[line_end - 1] == b'\r' {
            line_end - 1
        } else {
            line_end
        };
        let mut ws_start = content_end;
        while ws_start > line_start && matches!(bytes[ws_start - 1], b' ' | b'\t') {
            ws_start -= 1;
        }
        if ws_start < content_end && !in_string(ws_start) {
            edits.push(TextEdit::delete(TextSpan::new(ws_start, content_end)));
        }
        if line_end == bytes.len() {
            break;
        }
        line_start = line_end + 1;
    }
}
