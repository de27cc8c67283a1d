//! One batch run over a loaded workspace.
//!
//! ```text
//! Loaded ──analyze──▶ Analyzed ──format / fix──▶ Edited
//!                        │                         │
//!                        └────────commit───────────┴──▶ Committed | Rejected
//! ```
//!
//! Edits accumulate in a working snapshot derived from the snapshot taken
//! at load time. Nothing reaches the store until [`Run::commit`], which
//! applies every change or none.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FmtError, Result};
use crate::format::{FormatOptions, Formatter, format_solution};
use crate::lint::{LintEngine, LintReport, RuleFailure};
use crate::syntax::LoadDiagnostic;
use crate::workspace::{ChangeCoordinator, ChangeSet, CommitReport, Document, DocumentId, Solution, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Loaded,
    Analyzed,
    Edited,
    Committed,
    Rejected,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::Analyzed => "analyzed",
            Self::Edited => "edited",
            Self::Committed => "committed",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Documents an edit step could not process. They keep their text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditSummary {
    pub changed: Vec<DocumentId>,
    pub skipped: Vec<RuleFailure>,
}

pub struct Run<'w> {
    workspace: &'w Workspace,
    base: Arc<Solution>,
    working: Solution,
    state: RunState,
    report: Option<LintReport>,
}

impl<'w> Run<'w> {
    /// Begin a run against the workspace's current snapshot.
    ///
    /// Fails with [`FmtError::LoadFailed`] if loading produced any
    /// failure-severity diagnostic.
    pub fn start(workspace: &'w Workspace, load_diagnostics: &[LoadDiagnostic]) -> Result<Self> {
        let failures: Vec<String> = load_diagnostics
            .iter()
            .filter(|d| d.is_failure())
            .map(ToString::to_string)
            .collect();
        if !failures.is_empty() {
            return Err(FmtError::LoadFailed(failures.join("; ")));
        }
        for diagnostic in load_diagnostics {
            warn!(%diagnostic, "load warning");
        }

        let base = workspace.current_solution();
        let working = (*base).clone();
        Ok(Self {
            workspace,
            base,
            working,
            state: RunState::Loaded,
            report: None,
        })
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// The snapshot edits have been applied to so far.
    #[must_use]
    pub const fn working(&self) -> &Solution {
        &self.working
    }

    #[must_use]
    pub const fn report(&self) -> Option<&LintReport> {
        self.report.as_ref()
    }

    fn expect_state(&self, allowed: &[RunState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(FmtError::InvalidState(format!(
                "cannot {action} a run that is {}",
                self.state
            )))
        }
    }

    fn documents(&self) -> Vec<Document> {
        self.working.documents().cloned().collect()
    }

    /// Evaluate every rule against the load-time snapshot.
    pub fn analyze(&mut self, engine: &LintEngine) -> Result<&LintReport> {
        self.expect_state(&[RunState::Loaded], "analyze")?;
        let report = engine.check(&self.documents())?;
        self.state = RunState::Analyzed;
        Ok(self.report.insert(report))
    }

    /// Stage formatter output for every document.
    pub fn format(&mut self, formatter: &dyn Formatter, options: &FormatOptions) -> Result<EditSummary> {
        self.expect_state(&[RunState::Analyzed, RunState::Edited], "format")?;
        let outcome = format_solution(formatter, &self.working, options);
        let skipped = outcome
            .failures
            .into_iter()
            .map(|(document, err)| RuleFailure {
                rule_id: "format".to_string(),
                document,
                message: err.to_string(),
            })
            .collect();
        let changed = self.stage(outcome.changes)?;
        Ok(EditSummary { changed, skipped })
    }

    /// Stage auto-fixes from every fixable rule.
    pub fn fix(&mut self, engine: &LintEngine) -> Result<EditSummary> {
        self.expect_state(&[RunState::Analyzed, RunState::Edited], "fix")?;
        let outcome = engine.fix_documents(&self.documents(), self.working.front_end());
        let changed = self.stage(outcome.changes)?;
        Ok(EditSummary {
            changed,
            skipped: outcome.failures,
        })
    }

    fn stage(&mut self, changes: ChangeSet) -> Result<Vec<DocumentId>> {
        let changes = changes.without_noops(&self.working);
        let mut changed = Vec::with_capacity(changes.len());
        for (id, text) in changes.iter() {
            let (next, diagnostics) = self.working.with_document_text(id, text)?;
            for diagnostic in diagnostics {
                warn!(document = %id, %diagnostic, "edited text parses with problems");
            }
            self.working = next;
            changed.push(id);
        }
        self.state = RunState::Edited;
        Ok(changed)
    }

    /// Every document whose working text differs from the load-time snapshot.
    #[must_use]
    pub fn pending_changes(&self) -> ChangeSet {
        self.working
            .changed_documents(&self.base)
            .into_iter()
            .filter_map(|id| {
                self.working
                    .document(id)
                    .map(|doc| (id, doc.text().to_string()))
            })
            .collect()
    }

    /// Commit all pending changes in one step.
    ///
    /// On rejection the run moves to [`RunState::Rejected`] and the
    /// workspace is untouched.
    pub fn commit(&mut self) -> Result<CommitReport> {
        self.expect_state(&[RunState::Analyzed, RunState::Edited], "commit")?;
        let changes = self.pending_changes();
        match ChangeCoordinator::new(self.workspace).apply(&self.base, changes) {
            Ok(report) => {
                self.state = RunState::Committed;
                info!(version = report.version, documents = report.changed.len(), "run committed");
                Ok(report)
            }
            Err(err) => {
                self.state = RunState::Rejected;
                warn!(error = %err, "run rejected");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::format::StructuralFormatter;
    use crate::lint::{LintConfig, OrderComparator, all_rules};
    use crate::syntax::CSharpFrontEnd;
    use crate::workspace::{DocumentStore, MemoryStore, SolutionBuilder};

    const UNSORTED: &str = "using B;\nusing A;\nclass C { void M() { if(x) { } } }\n";

    fn workspace() -> (Workspace, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert("P.cs", UNSORTED);
        let mut builder = SolutionBuilder::new(Arc::new(CSharpFrontEnd));
        let project = builder.add_project("App", "App.csproj");
        builder.add_document(project, "P.cs", UNSORTED);
        let (solution, _) = builder.build();
        (Workspace::new(solution, store.clone()), store)
    }

    fn engine() -> LintEngine {
        let mut engine = LintEngine::new(LintConfig::default());
        for rule in all_rules(&OrderComparator::Alphabetical, &FormatOptions::default()) {
            engine.register(rule);
        }
        engine
    }

    #[test]
    fn full_run_commits_fixed_and_formatted_text() {
        let (ws, store) = workspace();
        let mut run = Run::start(&ws, &[]).unwrap();
        assert_eq!(run.state(), RunState::Loaded);

        let report = run.analyze(&engine()).unwrap();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);

        run.fix(&engine()).unwrap();
        run.format(&StructuralFormatter, &FormatOptions::default()).unwrap();
        assert_eq!(run.state(), RunState::Edited);

        let commit = run.commit().unwrap();
        assert_eq!(commit.version, 1);
        assert_eq!(run.state(), RunState::Committed);
        assert_eq!(
            store.read(Path::new("P.cs")).unwrap(),
            "using A;\nusing B;\nclass C { void M() { if (x) { } } }\n"
        );
    }

    #[test]
    fn out_of_order_transitions_are_rejected() {
        let (ws, _) = workspace();
        let mut run = Run::start(&ws, &[]).unwrap();
        assert!(matches!(run.commit(), Err(FmtError::InvalidState(_))));
        assert!(matches!(
            run.format(&StructuralFormatter, &FormatOptions::default()),
            Err(FmtError::InvalidState(_))
        ));

        run.analyze(&engine()).unwrap();
        assert!(matches!(run.analyze(&engine()), Err(FmtError::InvalidState(_))));
        run.commit().unwrap();
        assert!(matches!(run.fix(&engine()), Err(FmtError::InvalidState(_))));
    }

    #[test]
    fn load_failure_stops_before_analysis() {
        let (ws, _) = workspace();
        let diagnostics = [LoadDiagnostic::failure("project 'Gone' not found")];
        let err = Run::start(&ws, &diagnostics).err().unwrap();
        assert!(matches!(err, FmtError::LoadFailed(_)));
    }

    #[test]
    fn rejected_commit_leaves_store_untouched() {
        let (ws, store) = workspace();
        let mut run = Run::start(&ws, &[]).unwrap();
        run.analyze(&engine()).unwrap();
        run.format(&StructuralFormatter, &FormatOptions::default()).unwrap();

        store.set_fail_writes(true);
        let err = run.commit().unwrap_err();
        assert!(matches!(err, FmtError::CommitRejected(_)));
        assert_eq!(run.state(), RunState::Rejected);
        assert_eq!(ws.version(), 0);
        assert_eq!(store.read(Path::new("P.cs")).unwrap(), UNSORTED);
    }

    #[test]
    fn analyzed_run_without_edits_commits_nothing() {
        let (ws, _) = workspace();
        let mut run = Run::start(&ws, &[]).unwrap();
        run.analyze(&engine()).unwrap();
        assert!(run.pending_changes().is_empty());
        let commit = run.commit().unwrap();
        assert!(commit.changed.is_empty());
        assert_eq!(ws.version(), 0);
    }
}
