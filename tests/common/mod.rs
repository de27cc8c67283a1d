//! Helpers shared by the integration tests.

#![allow(dead_code)]

use sharpfmt::lint::{Diagnostic, LintConfig, Rule, RuleContext};
use sharpfmt::syntax::{CSharpFrontEnd, TextSpan};
use sharpfmt::test_utils::parse_markup;
use sharpfmt::workspace::{Document, DocumentId};

pub use sharpfmt::test_utils::{ProjectFixture, memory_workspace};

/// Parse `text` as document 0.
pub fn document(text: &str) -> Document {
    Document::parse(DocumentId::new(0), "Test.cs", text, &CSharpFrontEnd).0
}

/// Evaluate `rule` over `text` with the default lint configuration.
pub fn evaluate(rule: &dyn Rule, text: &str) -> Vec<Diagnostic> {
    let config = LintConfig::default();
    let doc = document(text);
    rule.evaluate(&RuleContext::new(&doc, &config))
        .expect("rule evaluation succeeds")
}

/// Assert that `rule` reports exactly the spans marked with `[| |]` in
/// `marked`, in order.
pub fn verify_spans(rule: &dyn Rule, marked: &str) {
    let (text, expected) = parse_markup(marked);
    let actual: Vec<TextSpan> = evaluate(rule, &text).iter().map(|d| d.span).collect();
    assert_eq!(actual, expected, "diagnostic spans for:\n{text}");
}

/// Apply `rule`'s fix to `text`.
pub fn fixed(rule: &dyn Rule, text: &str) -> String {
    let config = LintConfig::default();
    let doc = document(text);
    let edits = rule
        .fix(&RuleContext::new(&doc, &config))
        .expect("fix succeeds");
    sharpfmt::format::apply_edits(text, &edits).expect("edits apply")
}
