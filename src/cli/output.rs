use std::path::Path;

use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;

use crate::error::{FmtError, Result};
use crate::lint::{Diagnostic, LintReport, RuleFailure, RuleInfo, Severity};
use crate::syntax::{LineSpan, TextSpan};
use crate::workspace::{CommitReport, Solution};

/// JSON document printed in `--format json` mode.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Violations { count: usize },
    Error { code: String, message: String },
}

pub fn envelope<T: Serialize>(status: Status, data: T) -> Envelope<T> {
    Envelope {
        status,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
        warnings: Vec::new(),
    }
}

pub fn error_envelope(err: &FmtError) -> Envelope<serde_json::Value> {
    envelope(
        Status::Error {
            code: error_code(err).to_string(),
            message: err.to_string(),
        },
        serde_json::Value::Null,
    )
}

const fn error_code(err: &FmtError) -> &'static str {
    match err {
        FmtError::Io(_) => "io",
        FmtError::Config(_) => "config",
        FmtError::NotFound(_) => "not_found",
        FmtError::LoadFailed(_) => "load_failed",
        FmtError::TreeUnavailable { .. } => "tree_unavailable",
        FmtError::RuleFailed { .. } => "rule_failed",
        FmtError::InvalidSpan { .. } | FmtError::OverlappingEdits { .. } => "invalid_edit",
        FmtError::CommitRejected(_) => "commit_rejected",
        FmtError::InvalidState(_) => "invalid_state",
        FmtError::UnknownDocument(_) => "unknown_document",
        FmtError::NotImplemented(_) => "not_implemented",
        FmtError::Serialization(_) => "serialization",
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| FmtError::Serialization(format!("serialize output: {err}")))?;
    println!("{payload}");
    Ok(())
}

pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanLayout {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 12,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let padded = format!("{key:width$}", width = self.key_width);
        self.lines.push(format!("{} {value}", style(padded).dim()));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    #[must_use]
    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}

/// A diagnostic with its file and line/column position resolved.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedDiagnostic {
    pub path: String,
    pub rule_id: String,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    pub span: TextSpan,
    pub location: Option<LineSpan>,
}

impl LocatedDiagnostic {
    #[must_use]
    pub fn resolve(diag: &Diagnostic, solution: &Solution) -> Self {
        let document = solution.document(diag.document);
        Self {
            path: document.map_or_else(|| diag.document.to_string(), |d| d.path().display().to_string()),
            rule_id: diag.rule_id.clone(),
            severity: diag.severity,
            category: diag.category.to_string(),
            message: diag.message.clone(),
            span: diag.span,
            location: document.map(|d| diag.line_span(&d.line_index())),
        }
    }
}

/// Everything a run produced, as rendered to the user.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub target: String,
    pub documents: usize,
    pub diagnostics: Vec<LocatedDiagnostic>,
    pub failures: Vec<RuleFailure>,
    pub errors: usize,
    pub warnings: usize,
    pub commit: Option<CommitReport>,
}

impl RunSummary {
    #[must_use]
    pub fn new(target: &Path, solution: &Solution, report: &LintReport, commit: Option<CommitReport>) -> Self {
        Self {
            target: target.display().to_string(),
            documents: solution.len(),
            diagnostics: report
                .diagnostics
                .iter()
                .map(|d| LocatedDiagnostic::resolve(d, solution))
                .collect(),
            failures: report.failures.clone(),
            errors: report.error_count(),
            warnings: report.warning_count(),
            commit,
        }
    }
}

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Error => style("error").red().bold().to_string(),
        Severity::Warning => style("warning").yellow().to_string(),
        Severity::Info => style("info").blue().to_string(),
    }
}

/// Human rendering of a run, grouped by file.
#[must_use]
pub fn render_summary(summary: &RunSummary, rules: &[RuleInfo], verbose_rules: bool) -> HumanLayout {
    let mut layout = HumanLayout::new();

    let mut current: Option<&str> = None;
    for diag in &summary.diagnostics {
        if current != Some(diag.path.as_str()) {
            if current.is_some() {
                layout.blank();
            }
            layout.push_line(format!("{} {}", style("✗").red(), style(&diag.path).bold()));
            current = Some(diag.path.as_str());
        }
        let location = diag
            .location
            .map(|l| format!("{}:{}", l.start.line, l.start.column))
            .unwrap_or_default();
        layout.push_line(format!(
            "  {} {} {} {}",
            severity_label(diag.severity),
            style(&diag.rule_id).dim(),
            diag.message,
            style(location).dim()
        ));
        if verbose_rules {
            if let Some(rule) = rules.iter().find(|r| r.id == diag.rule_id) {
                layout.push_line(format!("    {} {}", style("rule:").cyan(), rule.description));
            }
        }
    }
    if current.is_some() {
        layout.blank();
    }

    for failure in &summary.failures {
        layout.push_line(format!(
            "{} {} on {}: {}",
            style("!").yellow(),
            failure.rule_id,
            failure.document,
            failure.message
        ));
    }

    layout.section("Summary");
    layout.kv("Target", &summary.target);
    layout.kv("Documents", &summary.documents.to_string());
    layout.kv("Errors", &summary.errors.to_string());
    layout.kv("Warnings", &summary.warnings.to_string());
    if !summary.failures.is_empty() {
        layout.kv("Failures", &summary.failures.len().to_string());
    }
    if let Some(commit) = &summary.commit {
        layout.kv("Changed", &commit.changed.len().to_string());
        layout.kv("Version", &commit.version.to_string());
    }
    layout
}

#[must_use]
pub fn render_rule(rule: &RuleInfo) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&format!("Rule: {}", rule.id));
    layout.kv("Title", &rule.title);
    layout.kv("Message", &rule.message);
    layout.kv("Category", &rule.category.to_string());
    layout.kv("Severity", &rule.severity.to_string());
    layout.kv("Auto-fix", if rule.can_fix { "yes" } else { "no" });
    if rule.disabled {
        layout.kv("Status", "disabled");
    }
    layout.blank();
    layout.section("Description");
    layout.push_line(rule.description.clone());
    layout
}

#[must_use]
pub fn render_rule_list(rules: &[RuleInfo]) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Available rules");
    for rule in rules {
        let fix_badge = if rule.can_fix { " [fixable]" } else { "" };
        let disabled = if rule.disabled { " (disabled)" } else { "" };
        layout.bullet(&format!(
            "{} - {} ({}, {}){fix_badge}{disabled}",
            rule.id, rule.title, rule.category, rule.severity
        ));
    }
    layout
}
