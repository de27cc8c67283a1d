//! Rule trait and the context rules evaluate against.

use crate::error::{FmtError, Result};
use crate::format::TextEdit;
use crate::workspace::{Document, DocumentId};

use super::config::LintConfig;
use super::diagnostic::{Diagnostic, RuleCategory, Severity};

/// A style rule evaluated against one document at a time.
///
/// Rules are stateless after construction. Any policy a rule needs (such as
/// its comparator) is fixed when it is built, so a single instance can be
/// shared by every worker thread.
pub trait Rule: Send + Sync {
    /// Unique identifier (e.g. "directive-order")
    fn id(&self) -> &str;

    /// Short human-readable title
    fn title(&self) -> &str;

    /// Message template used in diagnostics
    fn message(&self) -> &str;

    /// Longer description of what the rule checks
    fn description(&self) -> &str;

    fn category(&self) -> RuleCategory;

    fn default_severity(&self) -> Severity;

    /// Examine the document and report violations.
    ///
    /// Fails with [`FmtError::TreeUnavailable`] when the document has no
    /// syntax tree. Must not mutate the document.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>>;

    fn can_fix(&self) -> bool {
        false
    }

    /// Edits that resolve every violation [`Rule::evaluate`] would report.
    fn fix(&self, _ctx: &RuleContext<'_>) -> Result<Vec<TextEdit>> {
        Err(FmtError::NotImplemented(format!(
            "auto-fix not implemented for rule '{}'",
            self.id()
        )))
    }
}

/// A boxed rule for dynamic dispatch
pub type BoxedRule = Box<dyn Rule>;

/// What a rule sees for one evaluation.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub config: &'a LintConfig,
}

impl<'a> RuleContext<'a> {
    #[must_use]
    pub const fn new(document: &'a Document, config: &'a LintConfig) -> Self {
        Self { document, config }
    }

    #[must_use]
    pub const fn document_id(&self) -> DocumentId {
        self.document.id()
    }

    #[must_use]
    pub fn text(&self) -> &'a str {
        self.document.text()
    }
}
