//! All-or-nothing application of multi-document text changes.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{FmtError, Result};
use crate::syntax::LoadDiagnostic;

use super::document::DocumentId;
use super::live::Workspace;
use super::solution::Solution;

/// Proposed full texts keyed by document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    texts: BTreeMap<DocumentId, String>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose `text` for `id`, replacing any earlier proposal.
    pub fn insert(&mut self, id: DocumentId, text: impl Into<String>) {
        self.texts.insert(id, text.into());
    }

    /// Get the proposed text for a document
    #[must_use]
    pub fn get(&self, id: DocumentId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    /// Iterate proposals in document order
    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &str)> {
        self.texts.iter().map(|(id, text)| (*id, text.as_str()))
    }

    /// Get number of proposed documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Check if nothing is proposed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Drop proposals whose text equals what `base` already holds.
    #[must_use]
    pub fn without_noops(mut self, base: &Solution) -> Self {
        self.texts
            .retain(|id, text| base.document(*id).is_none_or(|doc| doc.text() != text));
        self
    }
}

impl FromIterator<(DocumentId, String)> for ChangeSet {
    fn from_iter<T: IntoIterator<Item = (DocumentId, String)>>(iter: T) -> Self {
        Self {
            texts: iter.into_iter().collect(),
        }
    }
}

/// A snapshot with every proposed text substituted, not yet committed.
#[derive(Debug, Clone)]
pub struct StagedChanges {
    pub solution: Solution,
    pub changed: Vec<DocumentId>,
    /// Parse diagnostics for the new texts.
    pub diagnostics: Vec<LoadDiagnostic>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommitReport {
    pub version: u64,
    pub changed: Vec<DocumentId>,
}

/// Stages change sets against a snapshot and commits them in one call.
pub struct ChangeCoordinator<'w> {
    workspace: &'w Workspace,
}

impl<'w> ChangeCoordinator<'w> {
    #[must_use]
    pub const fn new(workspace: &'w Workspace) -> Self {
        Self { workspace }
    }

    /// Build a new snapshot from `base` with every text in `changes`.
    pub fn stage(&self, base: &Solution, changes: ChangeSet) -> Result<StagedChanges> {
        let changes = changes.without_noops(base);
        let mut solution = base.clone();
        let mut changed = Vec::with_capacity(changes.len());
        let mut diagnostics = Vec::new();

        for (id, text) in changes.texts {
            let (next, parse_diagnostics) = solution.with_document_text(id, text)?;
            solution = next;
            diagnostics.extend(parse_diagnostics);
            changed.push(id);
        }
        debug!(documents = changed.len(), base = base.version(), "staged change set");

        Ok(StagedChanges {
            solution,
            changed,
            diagnostics,
        })
    }

    /// Commit staged changes. Nothing is applied unless everything is.
    pub fn commit(&self, staged: StagedChanges) -> Result<CommitReport> {
        if staged.changed.is_empty() {
            debug!("nothing to commit");
            return Ok(CommitReport {
                version: self.workspace.version(),
                changed: Vec::new(),
            });
        }

        let base = staged.solution.version();
        let changed = staged.changed;
        match self.workspace.try_apply_changes(staged.solution) {
            Ok(true) => {
                let report = CommitReport {
                    version: self.workspace.version(),
                    changed,
                };
                info!(version = report.version, documents = report.changed.len(), "change set applied");
                Ok(report)
            }
            Ok(false) => Err(FmtError::CommitRejected(format!(
                "workspace moved past version {base} while {} document(s) were being edited",
                changed.len()
            ))),
            Err(err) => Err(FmtError::CommitRejected(format!(
                "store refused change set: {err}"
            ))),
        }
    }

    /// Stage and commit in one call.
    pub fn apply(&self, base: &Solution, changes: ChangeSet) -> Result<CommitReport> {
        let staged = self.stage(base, changes)?;
        self.commit(staged)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::syntax::CSharpFrontEnd;
    use crate::workspace::SolutionBuilder;
    use crate::workspace::store::{DocumentStore, MemoryStore};

    fn setup() -> (Workspace, Arc<MemoryStore>, DocumentId, DocumentId) {
        let store = Arc::new(MemoryStore::new());
        store.insert("A.cs", "a\n");
        store.insert("B.cs", "b\n");
        let mut builder = SolutionBuilder::new(Arc::new(CSharpFrontEnd));
        let project = builder.add_project("App", "App.csproj");
        let a = builder.add_document(project, "A.cs", "a\n");
        let b = builder.add_document(project, "B.cs", "b\n");
        let (solution, _) = builder.build();
        (Workspace::new(solution, store.clone()), store, a, b)
    }

    #[test]
    fn noop_entries_are_dropped() {
        let (ws, _, a, b) = setup();
        let base = ws.current_solution();
        let changes: ChangeSet = [(a, "a\n".to_string()), (b, "b2\n".to_string())]
            .into_iter()
            .collect();
        let staged = ChangeCoordinator::new(&ws).stage(&base, changes).unwrap();
        assert_eq!(staged.changed, vec![b]);
    }

    #[test]
    fn apply_commits_every_document() {
        let (ws, store, a, b) = setup();
        let base = ws.current_solution();
        let mut changes = ChangeSet::new();
        changes.insert(a, "a2\n");
        changes.insert(b, "b2\n");

        let report = ChangeCoordinator::new(&ws).apply(&base, changes).unwrap();
        assert_eq!(report.version, 1);
        assert_eq!(report.changed, vec![a, b]);
        assert_eq!(store.read(Path::new("A.cs")).unwrap(), "a2\n");
        assert_eq!(store.read(Path::new("B.cs")).unwrap(), "b2\n");
    }

    #[test]
    fn empty_change_set_commits_nothing() {
        let (ws, _, _, _) = setup();
        let base = ws.current_solution();
        let report = ChangeCoordinator::new(&ws)
            .apply(&base, ChangeSet::new())
            .unwrap();
        assert_eq!(report.version, 0);
        assert!(report.changed.is_empty());
    }

    #[test]
    fn store_failure_is_a_rejection() {
        let (ws, store, a, _) = setup();
        store.set_fail_writes(true);
        let base = ws.current_solution();
        let mut changes = ChangeSet::new();
        changes.insert(a, "a2\n");
        let err = ChangeCoordinator::new(&ws).apply(&base, changes).unwrap_err();
        assert!(matches!(err, FmtError::CommitRejected(_)));
        assert_eq!(store.read(Path::new("A.cs")).unwrap(), "a\n");
    }
}
