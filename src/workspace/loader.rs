//! Loading `.csproj` projects and `.sln` solutions from disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{FmtError, Result};
use crate::syntax::{FrontEnd, LoadDiagnostic};

use super::solution::{Solution, SolutionBuilder};

static SLN_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*Project\("\{[^}]*\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)""#)
        .expect("valid solution project regex")
});

const SKIPPED_DIRS: &[&str] = &["bin", "obj", "node_modules"];

/// Result of loading a target: the snapshot plus every load diagnostic.
#[derive(Debug)]
pub struct LoadResult {
    pub solution: Solution,
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl LoadResult {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.diagnostics.iter().any(LoadDiagnostic::is_failure)
    }
}

/// Opens project and solution files.
pub struct ProjectLoader {
    front_end: Arc<dyn FrontEnd>,
}

impl ProjectLoader {
    pub fn new(front_end: Arc<dyn FrontEnd>) -> Self {
        Self { front_end }
    }

    /// Load a `.sln` or `.csproj` file.
    pub fn load(&self, target: &Path) -> Result<LoadResult> {
        if !target.is_file() {
            return Err(FmtError::NotFound(target.to_path_buf()));
        }
        let mut builder = SolutionBuilder::new(Arc::clone(&self.front_end));
        match extension(target).as_deref() {
            Some("sln") => self.load_solution(target, &mut builder)?,
            Some("csproj") => {
                let mut seen = HashSet::new();
                Self::load_project(target, &mut builder, &mut seen);
            }
            _ => {
                return Err(FmtError::LoadFailed(format!(
                    "unsupported target {} (expected .sln or .csproj)",
                    target.display()
                )));
            }
        }

        let (solution, diagnostics) = builder.build();
        info!(
            target = %target.display(),
            projects = solution.projects().len(),
            documents = solution.len(),
            diagnostics = diagnostics.len(),
            "loaded"
        );
        Ok(LoadResult {
            solution,
            diagnostics,
        })
    }

    fn load_solution(&self, sln: &Path, builder: &mut SolutionBuilder) -> Result<()> {
        let raw = fs::read_to_string(sln)?;
        let root = sln.parent().unwrap_or_else(|| Path::new("."));
        let mut seen = HashSet::new();

        for project in parse_solution_projects(&raw) {
            let path = root.join(&project.relative_path);
            if extension(&path).as_deref() != Some("csproj") {
                debug!(name = %project.name, "skipping non-C# solution entry");
                continue;
            }
            if !path.is_file() {
                builder.push_diagnostic(
                    LoadDiagnostic::failure(format!(
                        "project '{}' not found",
                        project.name
                    ))
                    .with_path(&path),
                );
                continue;
            }
            Self::load_project(&path, builder, &mut seen);
        }
        Ok(())
    }

    fn load_project(csproj: &Path, builder: &mut SolutionBuilder, seen: &mut HashSet<PathBuf>) {
        if let Err(err) = fs::read_to_string(csproj) {
            builder.push_diagnostic(
                LoadDiagnostic::failure(format!("cannot read project: {err}")).with_path(csproj),
            );
            return;
        }
        let name = csproj
            .file_stem()
            .map_or_else(|| "project".to_string(), |s| s.to_string_lossy().into_owned());
        let project = builder.add_project(name, csproj);
        let dir = csproj.parent().unwrap_or_else(|| Path::new("."));

        for path in source_files(dir) {
            if !seen.insert(path.clone()) {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(text) => {
                    builder.add_document(project, path, text);
                }
                Err(err) => builder.push_diagnostic(
                    LoadDiagnostic::failure(format!("cannot read source file: {err}"))
                        .with_path(&path),
                ),
            }
        }
    }
}

/// `*.cs` files under `dir`, skipping build output and hidden directories,
/// sorted by path.
#[must_use]
pub fn source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|path| extension(path).as_deref() == Some("cs"))
        .collect();
    files.sort();
    files
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d))
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// A `Project(...)` line from a solution file.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SolutionProject {
    pub name: String,
    pub relative_path: PathBuf,
}

/// Extract project entries from solution file text. Windows separators are
/// normalised.
#[must_use]
pub fn parse_solution_projects(raw: &str) -> Vec<SolutionProject> {
    SLN_PROJECT
        .captures_iter(raw)
        .map(|caps| SolutionProject {
            name: caps[1].to_string(),
            relative_path: caps[2].split(['\\', '/']).collect(),
        })
        .collect()
}
