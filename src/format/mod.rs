//! Whitespace formatting.
//!
//! A [`Formatter`] turns a document into a list of [`TextEdit`]s. The
//! pipeline applies them and folds the results into a
//! [`ChangeSet`](crate::workspace::ChangeSet) for one atomic commit.

pub mod edit;
pub mod structural;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FmtError, Result};
use crate::workspace::{ChangeSet, Document, DocumentId, Solution};

pub use edit::{TextEdit, apply_edits};
pub use structural::StructuralFormatter;

/// Options handed to the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// `if (x)` rather than `if(x)`.
    pub space_after_control_keyword: bool,
    pub trim_trailing_whitespace: bool,
    pub insert_final_newline: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            space_after_control_keyword: true,
            trim_trailing_whitespace: true,
            insert_final_newline: false,
        }
    }
}

/// Computes whitespace edits for a single document.
pub trait Formatter: Send + Sync {
    fn compute_edits(&self, document: &Document, options: &FormatOptions) -> Result<Vec<TextEdit>>;
}

/// Formatted text for `document`, or `None` when it is already formatted.
pub fn format_document(
    formatter: &dyn Formatter,
    document: &Document,
    options: &FormatOptions,
) -> Result<Option<String>> {
    let edits = formatter.compute_edits(document, options)?;
    if edits.is_empty() {
        return Ok(None);
    }
    let formatted = apply_edits(document.text(), &edits)?;
    Ok((formatted != document.text()).then_some(formatted))
}

/// Outcome of formatting every document in a snapshot.
#[derive(Debug, Default)]
pub struct FormatOutcome {
    pub changes: ChangeSet,
    /// Documents the formatter could not process. They are left unchanged.
    pub failures: Vec<(DocumentId, FmtError)>,
}

/// Format every document in `solution` in parallel.
pub fn format_solution(
    formatter: &dyn Formatter,
    solution: &Solution,
    options: &FormatOptions,
) -> FormatOutcome {
    let documents: Vec<&Document> = solution.documents().collect();
    let results: Vec<(DocumentId, Result<Option<String>>)> = documents
        .par_iter()
        .map(|doc| (doc.id(), format_document(formatter, doc, options)))
        .collect();

    let mut outcome = FormatOutcome::default();
    for (id, result) in results {
        match result {
            Ok(Some(text)) => outcome.changes.insert(id, text),
            Ok(None) => {}
            Err(err) => {
                debug!(document = %id, error = %err, "format skipped");
                outcome.failures.push((id, err));
            }
        }
    }
    outcome
}
