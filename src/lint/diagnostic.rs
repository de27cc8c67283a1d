//! Diagnostic types produced by rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::{LineIndex, LineSpan, TextSpan};
use crate::workspace::DocumentId;

/// Category of rule
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Whitespace and layout
    Formatting,
    /// Ordering of declarations and directives
    Ordering,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Formatting => write!(f, "formatting"),
            Self::Ordering => write!(f, "ordering"),
        }
    }
}

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A violation found by a rule, anchored to a byte range of one document.
///
/// Two diagnostics are equal when every field is equal.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub span: TextSpan,
    pub document: DocumentId,
    pub category: RuleCategory,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        document: DocumentId,
        span: TextSpan,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            span,
            document,
            category: RuleCategory::Formatting,
        }
    }

    pub fn error(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        document: DocumentId,
        span: TextSpan,
    ) -> Self {
        Self::new(rule_id, Severity::Error, message, document, span)
    }

    pub fn warning(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        document: DocumentId,
        span: TextSpan,
    ) -> Self {
        Self::new(rule_id, Severity::Warning, message, document, span)
    }

    pub fn info(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        document: DocumentId,
        span: TextSpan,
    ) -> Self {
        Self::new(rule_id, Severity::Info, message, document, span)
    }

    #[must_use]
    pub const fn with_category(mut self, category: RuleCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Line/column form of the span against the document text.
    #[must_use]
    pub fn line_span(&self, index: &LineIndex) -> LineSpan {
        index.line_span(self.span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} at {} {}",
            self.severity, self.rule_id, self.message, self.document, self.span
        )
    }
}
