//! Documents: immutable text plus the tree parsed from it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FmtError, Result};
use crate::syntax::{FrontEnd, LineIndex, LoadDiagnostic, SyntaxTree};

/// Stable identifier of a document within a solution.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct DocumentId(u32);

impl DocumentId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Snapshot of one source file.
///
/// Cloning is cheap: text and tree are shared.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: PathBuf,
    text: Arc<str>,
    tree: Option<Arc<SyntaxTree>>,
    parse_error: Option<String>,
}

impl Document {
    /// Parse `text` with `front_end` and wrap the result.
    ///
    /// Parse problems are returned alongside the document rather than as an
    /// error; a document without a tree still loads.
    pub fn parse(
        id: DocumentId,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
        front_end: &dyn FrontEnd,
    ) -> (Self, Vec<LoadDiagnostic>) {
        let path = path.into();
        let text: Arc<str> = text.into();
        let outcome = front_end.parse(&path, &text);
        let parse_error = if outcome.tree.is_none() {
            Some(
                outcome
                    .diagnostics
                    .last()
                    .map_or_else(|| "front end produced no tree".to_string(), |d| d.message.clone()),
            )
        } else {
            None
        };
        let document = Self {
            id,
            path,
            text,
            tree: outcome.tree.map(Arc::new),
            parse_error,
        };
        (document, outcome.diagnostics)
    }

    #[must_use]
    pub const fn id(&self) -> DocumentId {
        self.id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    #[must_use]
    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// The parsed tree, or `TreeUnavailable` if the front end could not
    /// produce one.
    pub fn syntax_root(&self) -> Result<&SyntaxTree> {
        self.tree
            .as_deref()
            .ok_or_else(|| FmtError::TreeUnavailable {
                document: self.id,
                reason: self
                    .parse_error
                    .clone()
                    .unwrap_or_else(|| "no syntax tree".to_string()),
            })
    }

    #[must_use]
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.text)
    }

    /// A new document with the same id and path and re-parsed `text`.
    pub fn with_text(
        &self,
        text: impl Into<Arc<str>>,
        front_end: &dyn FrontEnd,
    ) -> (Self, Vec<LoadDiagnostic>) {
        Self::parse(self.id, self.path.clone(), text, front_end)
    }
}
