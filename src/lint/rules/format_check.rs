//! Reports places where the formatter would change the document.

use std::sync::Arc;

use crate::error::Result;
use crate::format::{FormatOptions, Formatter, StructuralFormatter, TextEdit};
use crate::lint::diagnostic::{Diagnostic, RuleCategory, Severity};
use crate::lint::rule::{Rule, RuleContext};

pub struct FormatCheckRule {
    formatter: Arc<dyn Formatter>,
    options: FormatOptions,
}

impl FormatCheckRule {
    pub const ID: &'static str = "format-check";

    pub fn new(formatter: Arc<dyn Formatter>, options: FormatOptions) -> Self {
        Self { formatter, options }
    }

    #[must_use]
    pub fn structural(options: FormatOptions) -> Self {
        Self::new(Arc::new(StructuralFormatter), options)
    }

    fn describe(edit: &TextEdit) -> &'static str {
        match (edit.span.is_empty(), edit.replacement.is_empty()) {
            (true, _) => "Missing whitespace",
            (false, true) => "Unexpected whitespace",
            (false, false) => "Whitespace differs from formatted output",
        }
    }
}

impl Rule for FormatCheckRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn title(&self) -> &str {
        "Document must be formatted"
    }

    fn message(&self) -> &str {
        "Whitespace differs from formatted output"
    }

    fn description(&self) -> &str {
        "Runs the formatter and reports every edit it would make: spacing after control-flow \
         keywords, trailing whitespace and the final newline."
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Formatting
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>> {
        let edits = self.formatter.compute_edits(ctx.document, &self.options)?;
        Ok(edits
            .iter()
            .map(|edit| {
                Diagnostic::new(
                    self.id(),
                    self.default_severity(),
                    Self::describe(edit),
                    ctx.document_id(),
                    edit.span,
                )
                .with_category(self.category())
            })
            .collect())
    }

    fn can_fix(&self) -> bool {
        true
    }

    fn fix(&self, ctx: &RuleContext<'_>) -> Result<Vec<TextEdit>> {
        self.formatter.compute_edits(ctx.document, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FmtError;
    use crate::lint::LintConfig;
    use crate::syntax::{CSharpFrontEnd, TextSpan};
    use crate::workspace::{Document, DocumentId};

    fn doc(text: &str) -> Document {
        Document::parse(DocumentId::new(4), "T.cs", text, &CSharpFrontEnd).0
    }

    #[test]
    fn one_diagnostic_per_edit() {
        let rule = FormatCheckRule::structural(FormatOptions::default());
        let config = LintConfig::default();
        let document = doc("using A;  \nclass C { void M() { if(x) { } } }\n");
        let found = rule.evaluate(&RuleContext::new(&document, &config)).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].message, "Unexpected whitespace");
        assert_eq!(found[0].span, TextSpan::new(8, 10));
        assert_eq!(found[1].message, "Missing whitespace");
        assert!(found.iter().all(|d| d.document == DocumentId::new(4)));
        assert!(found.iter().all(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn clean_document_has_no_findings() {
        let rule = FormatCheckRule::structural(FormatOptions::default());
        let config = LintConfig::default();
        let document = doc("using A;\n");
        assert!(rule.evaluate(&RuleContext::new(&document, &config)).unwrap().is_empty());
    }

    #[test]
    fn missing_tree_is_an_error_not_a_diagnostic() {
        let rule = FormatCheckRule::structural(FormatOptions::default());
        let config = LintConfig::default();
        let document = doc("class C {");
        let err = rule.evaluate(&RuleContext::new(&document, &config)).unwrap_err();
        assert!(matches!(err, FmtError::TreeUnavailable { .. }));
    }
}
