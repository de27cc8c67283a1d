//! Using directives must be sorted within each scope.

use tracing::debug;

use crate::error::Result;
use crate::format::TextEdit;
use crate::lint::diagnostic::{Diagnostic, RuleCategory, Severity};
use crate::lint::order::OrderComparator;
use crate::lint::rule::{Rule, RuleContext};
use crate::lint::scope::{ImportDirective, Scope, ScopeWalker};
use crate::syntax::TextSpan;
use crate::syntax::lexer::{TokenKind, tokenize};

/// Reports one diagnostic per scope whose directive block is out of order.
///
/// The diagnostic spans the whole block, first directive to last, so a
/// single violation shows up no matter how many pairs are swapped. Scopes
/// never affect one another.
#[derive(Debug, Clone, Default)]
pub struct DirectiveOrderRule {
    comparator: OrderComparator,
}

impl DirectiveOrderRule {
    pub const ID: &'static str = "directive-order";

    #[must_use]
    pub const fn new(comparator: OrderComparator) -> Self {
        Self { comparator }
    }

    #[must_use]
    pub const fn comparator(&self) -> &OrderComparator {
        &self.comparator
    }

    fn unsorted_scopes(&self, ctx: &RuleContext<'_>) -> Result<Vec<Scope>> {
        let tree = ctx.document.syntax_root()?;
        Ok(ScopeWalker
            .scopes(tree)
            .into_iter()
            .filter(|scope| scope.directives.len() > 1 && !self.comparator.is_sorted(&scope.directives))
            .collect())
    }
}

impl Rule for DirectiveOrderRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn title(&self) -> &str {
        "Usings must be sorted"
    }

    fn message(&self) -> &str {
        "Must be sorted"
    }

    fn description(&self) -> &str {
        "Using directives in each file and namespace must be sorted. The order is ordinal by \
         imported name, or with the configured external prefixes (System by default) first."
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Ordering
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>> {
        let diagnostics: Vec<Diagnostic> = self
            .unsorted_scopes(ctx)?
            .iter()
            .filter_map(Scope::directive_block)
            .map(|block| {
                Diagnostic::new(
                    self.id(),
                    self.default_severity(),
                    self.message(),
                    ctx.document_id(),
                    block,
                )
                .with_category(self.category())
            })
            .collect();
        debug!(
            document = %ctx.document_id(),
            policy = self.comparator.name(),
            found = diagnostics.len(),
            "directive order checked"
        );
        Ok(diagnostics)
    }

    fn can_fix(&self) -> bool {
        true
    }

    /// Moves directive texts into sorted slots. Whatever separates the
    /// directives (blank lines, comments) stays in place. Directives never
    /// cross a preprocessor line, and `global using` stays ahead of the rest.
    fn fix(&self, ctx: &RuleContext<'_>) -> Result<Vec<TextEdit>> {
        let text = ctx.text();
        let mut edits = Vec::new();
        for scope in self.unsorted_scopes(ctx)? {
            for region in preprocessor_regions(text, &scope.directives) {
                let mut sorted: Vec<_> = region.iter().collect();
                // stable: equal keys keep their relative order
                sorted.sort_by(|a, b| {
                    b.is_global
                        .cmp(&a.is_global)
                        .then_with(|| self.comparator.compare(a, b))
                });
                for (slot, replacement) in region.iter().zip(sorted) {
                    if slot.span != replacement.span {
                        edits.push(TextEdit::replace(slot.span, replacement.span.slice(text)));
                    }
                }
            }
        }
        Ok(edits)
    }
}

/// Split `directives` wherever a preprocessor line sits between two of them.
fn preprocessor_regions<'d>(
    text: &str,
    directives: &'d [ImportDirective],
) -> Vec<&'d [ImportDirective]> {
    let mut regions = Vec::new();
    let mut start = 0;
    for (i, pair) in directives.windows(2).enumerate() {
        let gap = TextSpan::new(pair[0].span.end, pair[1].span.start).slice(text);
        // an unlexable gap is treated as a boundary
        let crosses = tokenize(gap).map_or(true, |tokens| {
            tokens.iter().any(|t| t.kind == TokenKind::Preprocessor)
        });
        if crosses {
            regions.push(&directives[start..=i]);
            start = i + 1;
        }
    }
    if start < directives.len() {
        regions.push(&directives[start..]);
    }
    if regions.len() > 1 {
        debug!(regions = regions.len(), "directive block split by preprocessor lines");
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::apply_edits;
    use crate::lint::LintConfig;
    use crate::syntax::CSharpFrontEnd;
    use crate::workspace::{Document, DocumentId};

    fn doc(text: &str) -> Document {
        Document::parse(DocumentId::new(0), "T.cs", text, &CSharpFrontEnd).0
    }

    fn evaluate(rule: &DirectiveOrderRule, text: &str) -> Vec<Diagnostic> {
        let config = LintConfig::default();
        rule.evaluate(&RuleContext::new(&doc(text), &config)).unwrap()
    }

    fn fixed(rule: &DirectiveOrderRule, text: &str) -> String {
        let config = LintConfig::default();
        let edits = rule.fix(&RuleContext::new(&doc(text), &config)).unwrap();
        apply_edits(text, &edits).unwrap()
    }

    #[test]
    fn sorted_block_is_clean() {
        let rule = DirectiveOrderRule::default();
        assert!(evaluate(&rule, "using A;\nusing B;\nusing C;\n").is_empty());
    }

    #[test]
    fn unsorted_block_reports_once_over_whole_block() {
        let rule = DirectiveOrderRule::default();
        let text = "using C;\nusing A;\nusing B;\n";
        let found = evaluate(&rule, text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].span, TextSpan::new(0, 26));
        assert_eq!(found[0].message, "Must be sorted");
        assert_eq!(found[0].severity, Severity::Error);
        assert_eq!(found[0].category, RuleCategory::Ordering);
    }

    #[test]
    fn fix_keeps_separators_in_place() {
        let rule = DirectiveOrderRule::default();
        let text = "using C;\n// keep\nusing A;\n\nusing B;\nclass X { }\n";
        assert_eq!(
            fixed(&rule, text),
            "using A;\n// keep\nusing B;\n\nusing C;\nclass X { }\n"
        );
    }

    #[test]
    fn fix_uses_external_first_policy() {
        let rule = DirectiveOrderRule::new(OrderComparator::external_first());
        let text = "using Alpha;\nusing System.Text;\nusing System;\n";
        assert_eq!(fixed(&rule, text), "using System;\nusing System.Text;\nusing Alpha;\n");
    }

    #[test]
    fn fixed_text_re_evaluates_clean() {
        let rule = DirectiveOrderRule::default();
        let text = "namespace N {\n  using Z;\n  using static M.Q;\n  using K = A.B;\n}\n";
        let out = fixed(&rule, text);
        assert!(evaluate(&rule, &out).is_empty());
        assert_eq!(out, "namespace N {\n  using K = A.B;\n  using static M.Q;\n  using Z;\n}\n");
    }

    #[test]
    fn fix_does_not_move_directives_across_conditionals() {
        let rule = DirectiveOrderRule::default();
        let text = "using D;\nusing C;\n#if DEBUG\nusing B;\nusing A;\n#endif\n";
        assert_eq!(
            fixed(&rule, text),
            "using C;\nusing D;\n#if DEBUG\nusing A;\nusing B;\n#endif\n"
        );
    }

    #[test]
    fn fix_keeps_global_usings_first() {
        let rule = DirectiveOrderRule::default();
        let text = "global using D;\nglobal using C;\nusing B;\nusing A;\n";
        assert_eq!(
            fixed(&rule, text),
            "global using C;\nglobal using D;\nusing A;\nusing B;\n"
        );
    }

    #[test]
    fn sorted_input_needs_no_edits() {
        let rule = DirectiveOrderRule::default();
        let config = LintConfig::default();
        let document = doc("using A;\nusing B;\n");
        assert!(rule.fix(&RuleContext::new(&document, &config)).unwrap().is_empty());
    }
}
