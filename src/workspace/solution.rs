//! Immutable solution snapshots.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{FmtError, Result};
use crate::syntax::{FrontEnd, LoadDiagnostic};

use super::document::{Document, DocumentId};

/// A project and the documents it owns.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub documents: Vec<DocumentId>,
}

/// Point-in-time view of every loaded document.
///
/// `version` is the version of the live snapshot this one was loaded from or
/// derived from. Substituting text never changes it; only a commit through
/// [`super::Workspace`] produces a new version.
#[derive(Clone)]
pub struct Solution {
    version: u64,
    projects: Arc<Vec<Project>>,
    documents: BTreeMap<DocumentId, Document>,
    front_end: Arc<dyn FrontEnd>,
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solution")
            .field("version", &self.version)
            .field("projects", &self.projects)
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

impl Solution {
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    #[must_use]
    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.documents.keys().copied().collect()
    }

    #[must_use]
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    #[must_use]
    pub fn document_by_path(&self, path: &Path) -> Option<&Document> {
        self.documents.values().find(|d| d.path() == path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn front_end(&self) -> &dyn FrontEnd {
        self.front_end.as_ref()
    }

    /// A new snapshot with `id`'s text replaced and re-parsed.
    pub fn with_document_text(
        &self,
        id: DocumentId,
        text: impl Into<Arc<str>>,
    ) -> Result<(Self, Vec<LoadDiagnostic>)> {
        let current = self.documents.get(&id).ok_or(FmtError::UnknownDocument(id))?;
        let (updated, diagnostics) = current.with_text(text, self.front_end.as_ref());
        let mut next = self.clone();
        next.documents.insert(id, updated);
        Ok((next, diagnostics))
    }

    /// Documents whose text differs from `base`.
    #[must_use]
    pub fn changed_documents(&self, base: &Self) -> Vec<DocumentId> {
        self.documents
            .iter()
            .filter(|(id, doc)| {
                base.documents
                    .get(id)
                    .is_none_or(|old| old.text() != doc.text())
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Assembles a [`Solution`] from projects and file texts.
pub struct SolutionBuilder {
    front_end: Arc<dyn FrontEnd>,
    projects: Vec<Project>,
    documents: BTreeMap<DocumentId, Document>,
    diagnostics: Vec<LoadDiagnostic>,
    next_id: u32,
}

impl SolutionBuilder {
    #[must_use]
    pub fn new(front_end: Arc<dyn FrontEnd>) -> Self {
        Self {
            front_end,
            projects: Vec::new(),
            documents: BTreeMap::new(),
            diagnostics: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a project and return its index.
    pub fn add_project(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> usize {
        self.projects.push(Project {
            name: name.into(),
            path: path.into(),
            documents: Vec::new(),
        });
        self.projects.len() - 1
    }

    /// Parse and add a document to `project`.
    ///
    /// # Panics
    ///
    /// Panics if `project` was not returned by [`Self::add_project`].
    pub fn add_document(
        &mut self,
        project: usize,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
    ) -> DocumentId {
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;
        let (document, diagnostics) = Document::parse(id, path, text, self.front_end.as_ref());
        self.diagnostics.extend(diagnostics);
        self.documents.insert(id, document);
        self.projects[project].documents.push(id);
        id
    }

    pub fn push_diagnostic(&mut self, diagnostic: LoadDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish at version 0, returning every load diagnostic collected.
    #[must_use]
    pub fn build(self) -> (Solution, Vec<LoadDiagnostic>) {
        let solution = Solution {
            version: 0,
            projects: Arc::new(self.projects),
            documents: self.documents,
            front_end: self.front_end,
        };
        (solution, self.diagnostics)
    }
}
