//! Rule runner: evaluates every (document, rule) pair and aggregates the
//! results.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{FmtError, Result};
use crate::format::apply_edits;
use crate::syntax::FrontEnd;
use crate::workspace::{ChangeSet, Document, DocumentId};

use super::config::LintConfig;
use super::diagnostic::{Diagnostic, RuleCategory, Severity};
use super::rule::{BoxedRule, Rule, RuleContext};

/// A rule that could not evaluate one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub document: DocumentId,
    pub message: String,
}

impl RuleFailure {
    fn new(rule: &dyn Rule, document: DocumentId, err: &FmtError) -> Self {
        Self {
            rule_id: rule.id().to_string(),
            document,
            message: err.to_string(),
        }
    }
}

/// Result of a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    /// Diagnostics in (document, rule) order, each rule's own order kept
    pub diagnostics: Vec<Diagnostic>,
    /// Pairs that failed to evaluate
    pub failures: Vec<RuleFailure>,
    /// Whether pairs were skipped because the run was cancelled
    pub cancelled: bool,
}

impl LintReport {
    /// Get all errors
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    /// Get all info diagnostics
    pub fn infos(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Info)
    }

    /// Get diagnostics by category
    pub fn by_category(&self, category: RuleCategory) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.category == category)
    }

    /// Get diagnostics for one document
    pub fn for_document(&self, document: DocumentId) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.document == document)
    }

    /// Get count of errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Get count of warnings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Get total diagnostic count
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// No error-severity diagnostics
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error_count() == 0
    }
}

/// Receives diagnostics grouped by document.
pub trait DiagnosticSink {
    /// Called once per input document, in input order, even when
    /// `diagnostics` is empty.
    fn report(&mut self, document: DocumentId, diagnostics: &[Diagnostic]);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, _document: DocumentId, diagnostics: &[Diagnostic]) {
        self.extend_from_slice(diagnostics);
    }
}

impl DiagnosticSink for BTreeMap<DocumentId, Vec<Diagnostic>> {
    fn report(&mut self, document: DocumentId, diagnostics: &[Diagnostic]) {
        self.entry(document)
            .or_default()
            .extend_from_slice(diagnostics);
    }
}

/// Shared flag for stopping a run early. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of collecting auto-fixes.
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// New full texts for documents that changed
    pub changes: ChangeSet,
    /// (document, rule id) for every fix applied
    pub applied: Vec<(DocumentId, String)>,
    pub failures: Vec<RuleFailure>,
}

enum PairOutcome {
    Evaluated(Vec<Diagnostic>),
    Failed(RuleFailure),
    Skipped,
}

/// Runs registered rules over documents.
pub struct LintEngine {
    rules: Vec<BoxedRule>,
    config: LintConfig,
}

impl LintEngine {
    /// Create an engine with no rules
    #[must_use]
    pub fn new(config: LintConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    /// Register a rule
    pub fn register(&mut self, rule: BoxedRule) {
        self.rules.push(rule);
    }

    /// Builder form of [`LintEngine::register`]
    #[must_use]
    pub fn with_rule(mut self, rule: BoxedRule) -> Self {
        self.register(rule);
        self
    }

    /// Get registered rules, in registration order
    #[must_use]
    pub fn rules(&self) -> &[BoxedRule] {
        &self.rules
    }

    #[must_use]
    pub const fn config(&self) -> &LintConfig {
        &self.config
    }

    fn active_rules(&self) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|rule| !self.config.is_rule_disabled(rule.id()))
            .map(|rule| &**rule)
            .collect()
    }

    /// Evaluate every enabled rule against every document.
    ///
    /// A pair that fails is recorded in [`LintReport::failures`] and the run
    /// continues with the remaining pairs.
    #[must_use]
    pub fn run(&self, documents: &[Document]) -> LintReport {
        self.run_inner(documents, None)
    }

    /// Like [`LintEngine::run`], but pairs not yet started when `token` is
    /// cancelled are skipped.
    #[must_use]
    pub fn run_cancellable(&self, documents: &[Document], token: &CancellationToken) -> LintReport {
        self.run_inner(documents, Some(token))
    }

    /// Run and hand each document's diagnostics to `sink`.
    pub fn run_with_sink(&self, documents: &[Document], sink: &mut dyn DiagnosticSink) -> LintReport {
        let report = self.run(documents);
        for document in documents {
            let found: Vec<Diagnostic> = report.for_document(document.id()).cloned().collect();
            sink.report(document.id(), &found);
        }
        report
    }

    /// Run, then fail on the first rule failure if the config asks for it.
    pub fn check(&self, documents: &[Document]) -> Result<LintReport> {
        let report = self.run(documents);
        if self.config.fail_on_rule_error {
            if let Some(failure) = report.failures.first() {
                return Err(FmtError::RuleFailed {
                    rule_id: failure.rule_id.clone(),
                    message: failure.message.clone(),
                });
            }
        }
        Ok(report)
    }

    fn run_inner(&self, documents: &[Document], token: Option<&CancellationToken>) -> LintReport {
        let rules = self.active_rules();
        let pairs: Vec<(&Document, &dyn Rule)> = documents
            .iter()
            .flat_map(|doc| rules.iter().map(move |rule| (doc, *rule)))
            .collect();

        let outcomes: Vec<PairOutcome> = pairs
            .par_iter()
            .map(|(document, rule)| {
                if token.is_some_and(CancellationToken::is_cancelled) {
                    return PairOutcome::Skipped;
                }
                let ctx = RuleContext::new(document, &self.config);
                match rule.evaluate(&ctx) {
                    Ok(found) => PairOutcome::Evaluated(found),
                    Err(err) => PairOutcome::Failed(RuleFailure::new(*rule, document.id(), &err)),
                }
            })
            .collect();

        let mut report = LintReport::default();
        for outcome in outcomes {
            match outcome {
                PairOutcome::Evaluated(found) => {
                    report.diagnostics.extend(found.into_iter().map(|diag| {
                        let severity = self.config.effective_severity(&diag.rule_id, diag.severity);
                        diag.with_severity(severity)
                    }));
                }
                PairOutcome::Failed(failure) => {
                    warn!(
                        rule = %failure.rule_id,
                        document = %failure.document,
                        error = %failure.message,
                        "rule evaluation failed"
                    );
                    report.failures.push(failure);
                }
                PairOutcome::Skipped => report.cancelled = true,
            }
        }

        info!(
            documents = documents.len(),
            rules = rules.len(),
            diagnostics = report.diagnostics.len(),
            failures = report.failures.len(),
            cancelled = report.cancelled,
            "lint run finished"
        );
        report
    }

    /// Apply every fixable rule to every document.
    ///
    /// Rules run in registration order; each sees the text left by the one
    /// before it. Documents whose text ends up unchanged are left out of the
    /// change set.
    #[must_use]
    pub fn fix_documents(&self, documents: &[Document], front_end: &dyn FrontEnd) -> FixOutcome {
        let fixers: Vec<&dyn Rule> = self
            .active_rules()
            .into_iter()
            .filter(|rule| rule.can_fix())
            .collect();

        let per_document: Vec<DocumentFix> = documents
            .par_iter()
            .map(|document| self.fix_document(document, &fixers, front_end))
            .collect();

        let mut outcome = FixOutcome::default();
        for fix in per_document {
            if let Some(text) = fix.text {
                outcome.changes.insert(fix.document, text);
            }
            outcome
                .applied
                .extend(fix.applied.into_iter().map(|rule| (fix.document, rule)));
            outcome.failures.extend(fix.failures);
        }
        for failure in &outcome.failures {
            warn!(rule = %failure.rule_id, document = %failure.document, error = %failure.message, "auto-fix failed");
        }
        outcome
    }

    fn fix_document(
        &self,
        document: &Document,
        fixers: &[&dyn Rule],
        front_end: &dyn FrontEnd,
    ) -> DocumentFix {
        let mut current = document.clone();
        let mut applied = Vec::new();
        let mut failures = Vec::new();

        for rule in fixers {
            let ctx = RuleContext::new(&current, &self.config);
            let fixed = rule.fix(&ctx).and_then(|edits| {
                if edits.is_empty() {
                    Ok(None)
                } else {
                    apply_edits(current.text(), &edits).map(Some)
                }
            });
            match fixed {
                Ok(Some(text)) => {
                    debug!(rule = rule.id(), document = %document.id(), "fix applied");
                    current = current.with_text(text, front_end).0;
                    applied.push(rule.id().to_string());
                }
                Ok(None) => {}
                Err(err) => failures.push(RuleFailure::new(*rule, document.id(), &err)),
            }
        }

        let text = (current.text() != document.text()).then(|| current.text().to_string());
        DocumentFix {
            document: document.id(),
            text,
            applied,
            failures,
        }
    }

    #[must_use]
    pub fn list_rules(&self) -> Vec<RuleInfo> {
        self.rules.iter().map(|r| self.rule_info(&**r)).collect()
    }

    #[must_use]
    pub fn explain(&self, rule_id: &str) -> Option<RuleInfo> {
        self.rules
            .iter()
            .find(|r| r.id() == rule_id)
            .map(|r| self.rule_info(&**r))
    }

    fn rule_info(&self, rule: &dyn Rule) -> RuleInfo {
        RuleInfo {
            id: rule.id().to_string(),
            title: rule.title().to_string(),
            message: rule.message().to_string(),
            description: rule.description().to_string(),
            category: rule.category(),
            default_severity: rule.default_severity(),
            severity: self
                .config
                .effective_severity(rule.id(), rule.default_severity()),
            can_fix: rule.can_fix(),
            disabled: self.config.is_rule_disabled(rule.id()),
        }
    }
}

struct DocumentFix {
    document: DocumentId,
    text: Option<String>,
    applied: Vec<String>,
    failures: Vec<RuleFailure>,
}

/// Snapshot of a registered rule's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: String,
    pub title: String,
    pub message: String,
    pub description: String,
    pub category: RuleCategory,
    pub default_severity: Severity,
    /// Severity after overrides and strict mode
    pub severity: Severity,
    pub can_fix: bool,
    pub disabled: bool,
}
