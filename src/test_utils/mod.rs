//! Shared helpers for unit and integration tests.

pub mod fixtures;
pub mod logging;

use std::fmt::Debug;

use crate::syntax::TextSpan;

pub use fixtures::{ProjectFixture, memory_workspace};
pub use logging::{CapturedLogs, LogEntry, capture_logs};

/// One row of a table-driven test.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

impl<I, E> TestCase<I, E> {
    pub const fn new(name: &'static str, input: I, expected: E) -> Self {
        Self {
            name,
            input,
            expected,
        }
    }
}

/// Run every case and report all mismatches together.
pub fn run_table_tests<I, E, F>(cases: &[TestCase<I, E>], test_fn: F) -> Result<(), String>
where
    I: Debug,
    E: Debug + PartialEq,
    F: Fn(&I) -> E,
{
    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| {
            let actual = test_fn(&case.input);
            (actual != case.expected).then(|| {
                format!(
                    "{}: input {:?}, expected {:?}, got {:?}",
                    case.name, case.input, case.expected, actual
                )
            })
        })
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("\n"))
    }
}

/// Strip `[|` / `|]` markers from `marked`, returning the plain text and the
/// span each pair enclosed, in order of appearance.
///
/// # Panics
///
/// Panics on unbalanced or nested markers.
#[must_use]
pub fn parse_markup(marked: &str) -> (String, Vec<TextSpan>) {
    let mut text = String::with_capacity(marked.len());
    let mut spans = Vec::new();
    let mut open: Option<usize> = None;
    let mut rest = marked;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[|") {
            assert!(open.is_none(), "nested [| in markup");
            open = Some(text.len());
            rest = after;
        } else if let Some(after) = rest.strip_prefix("|]") {
            let start = open.take().expect("|] without [| in markup");
            spans.push(TextSpan::new(start, text.len()));
            rest = after;
        } else {
            let ch = rest.chars().next().expect("non-empty rest");
            text.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    assert!(open.is_none(), "unclosed [| in markup");
    (text, spans)
}
