//! The single command: load, analyze, edit, commit, report.

use std::sync::Arc;

use tracing::info;

use crate::app::AppContext;
use crate::config::{Config, OutputFormat};
use crate::error::{FmtError, Result};
use crate::format::StructuralFormatter;
use crate::lint::rules::FormatCheckRule;
use crate::lint::{LintEngine, all_rules};
use crate::pipeline::Run;
use crate::syntax::CSharpFrontEnd;
use crate::workspace::{FileSystemStore, ProjectLoader, Workspace};

use super::output::{
    RunSummary, Status, emit_human, emit_json, envelope, render_rule, render_rule_list,
    render_summary,
};

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// `--check` found diagnostics
    Violations,
}

/// Engine with every built-in rule, configured from `config`.
#[must_use]
pub fn build_engine(config: &Config, no_format: bool) -> LintEngine {
    let mut lint = config.lint.clone();
    if no_format {
        lint.disabled_rules.insert(FormatCheckRule::ID.to_string());
    }
    let mut engine = LintEngine::new(lint);
    for rule in all_rules(&config.comparator(), &config.format) {
        engine.register(rule);
    }
    engine
}

pub fn run(ctx: &AppContext) -> Result<Outcome> {
    let engine = build_engine(&ctx.config, ctx.no_format);

    if let Some(rule_id) = &ctx.explain {
        let rule = engine
            .explain(rule_id)
            .ok_or_else(|| FmtError::Config(format!("unknown rule '{rule_id}'")))?;
        match ctx.output_format {
            OutputFormat::Json => emit_json(&envelope(Status::Ok, &rule))?,
            OutputFormat::Human => emit_human(render_rule(&rule)),
        }
        return Ok(Outcome::Clean);
    }
    if ctx.list_rules {
        let rules = engine.list_rules();
        match ctx.output_format {
            OutputFormat::Json => emit_json(&envelope(Status::Ok, &rules))?,
            OutputFormat::Human => emit_human(render_rule_list(&rules)),
        }
        return Ok(Outcome::Clean);
    }

    let target = ctx
        .target
        .as_deref()
        .ok_or_else(|| FmtError::Config("no project or solution given".to_string()))?;

    let loaded = ProjectLoader::new(Arc::new(CSharpFrontEnd)).load(target)?;
    let workspace = Workspace::new(loaded.solution, Arc::new(FileSystemStore));
    let base = workspace.current_solution();

    let mut run = Run::start(&workspace, &loaded.diagnostics)?;
    let report = run.analyze(&engine)?.clone();

    let commit = if ctx.check {
        None
    } else {
        if ctx.fix {
            let fixed = run.fix(&engine)?;
            info!(documents = fixed.changed.len(), "auto-fixes staged");
        }
        if !ctx.no_format {
            let formatted = run.format(&StructuralFormatter, &ctx.config.format)?;
            info!(
                documents = formatted.changed.len(),
                skipped = formatted.skipped.len(),
                "formatting staged"
            );
        }
        Some(run.commit()?)
    };

    let summary = RunSummary::new(target, &base, &report, commit);
    let violations = ctx.check && !report.diagnostics.is_empty();

    match ctx.output_format {
        OutputFormat::Json => {
            let status = if violations {
                Status::Violations {
                    count: report.total_count(),
                }
            } else {
                Status::Ok
            };
            let mut response = envelope(status, &summary);
            response.warnings = loaded.diagnostics.iter().map(ToString::to_string).collect();
            emit_json(&response)?;
        }
        OutputFormat::Human => {
            let rules = engine.list_rules();
            emit_human(render_summary(&summary, &rules, ctx.config.output.verbose_rules));
        }
    }

    Ok(if violations {
        Outcome::Violations
    } else {
        Outcome::Clean
    })
}
