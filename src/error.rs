//! Error types for sharpfmt.
//!
//! Violations found by rules are not errors; they are [`crate::lint::Diagnostic`]
//! values. This type covers everything that stops an operation from producing
//! a result at all.

use std::path::PathBuf;

use thiserror::Error;

use crate::workspace::DocumentId;

/// Main error type for sharpfmt.
#[derive(Error, Debug)]
pub enum FmtError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The front end or project loader reported a fatal diagnostic.
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// The front end produced no syntax tree for this document.
    #[error("Syntax tree unavailable for {document}: {reason}")]
    TreeUnavailable { document: DocumentId, reason: String },

    #[error("Rule '{rule_id}' failed: {message}")]
    RuleFailed { rule_id: String, message: String },

    #[error("Invalid span {start}..{end} for text of length {len}")]
    InvalidSpan { start: usize, end: usize, len: usize },

    #[error("Overlapping edits at {first_end} and {second_start}")]
    OverlappingEdits { first_end: usize, second_start: usize },

    /// The workspace refused the combined change set.
    #[error("Commit rejected: {0}")]
    CommitRejected(String),

    #[error("Invalid state transition: {0}")]
    InvalidState(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FmtError {
    /// Whether the error belongs to the fatal classes that must end a run
    /// with a non-zero exit status.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::TreeUnavailable { .. } | Self::RuleFailed { .. } | Self::NotImplemented(_)
        )
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FmtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_errors_are_not_fatal() {
        let err = FmtError::RuleFailed {
            rule_id: "directive-order".into(),
            message: "boom".into(),
        };
        assert!(!err.is_fatal());
        assert!(FmtError::CommitRejected("diverged".into()).is_fatal());
        assert!(FmtError::LoadFailed("missing project".into()).is_fatal());
    }

    #[test]
    fn display_includes_context() {
        let err = FmtError::TreeUnavailable {
            document: DocumentId::new(3),
            reason: "unbalanced braces".into(),
        };
        assert_eq!(
            err.to_string(),
            "Syntax tree unavailable for doc#3: unbalanced braces"
        );
    }
}
