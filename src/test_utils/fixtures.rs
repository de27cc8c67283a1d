//! On-disk and in-memory project fixtures.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::syntax::CSharpFrontEnd;
use crate::workspace::{DocumentId, MemoryStore, SolutionBuilder, Workspace};

const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>
"#;

/// A temporary directory laid out like a C# checkout.
pub struct ProjectFixture {
    dir: TempDir,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on any filesystem error.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write fixture file");
        path
    }

    /// Write a minimal SDK-style project at `<name>/<name>.csproj`.
    pub fn project(&self, name: &str) -> PathBuf {
        self.write(&format!("{name}/{name}.csproj"), CSPROJ)
    }

    /// Write a source file inside project `name`.
    pub fn source(&self, project: &str, file: &str, content: &str) -> PathBuf {
        self.write(&format!("{project}/{file}"), content)
    }

    /// Write `<name>.sln` referencing the given projects.
    pub fn solution(&self, name: &str, projects: &[&str]) -> PathBuf {
        let mut sln = String::from("Microsoft Visual Studio Solution File, Format Version 12.00\n");
        for project in projects {
            sln.push_str(&format!(
                "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{project}\", \"{project}\\{project}.csproj\", \"{{00000000-0000-0000-0000-000000000000}}\"\nEndProject\n"
            ));
        }
        self.write(&format!("{name}.sln"), &sln)
    }

    /// # Panics
    ///
    /// Panics if the file cannot be read.
    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(relative)).expect("read fixture file")
    }
}

/// A workspace over a [`MemoryStore`] seeded with `files`, one project.
///
/// Document ids follow the order of `files`.
#[must_use]
pub fn memory_workspace(files: &[(&str, &str)]) -> (Workspace, Arc<MemoryStore>, Vec<DocumentId>) {
    let store = Arc::new(MemoryStore::new());
    let mut builder = SolutionBuilder::new(Arc::new(CSharpFrontEnd));
    let project = builder.add_project("App", "App.csproj");
    let ids = files
        .iter()
        .map(|(path, text)| {
            store.insert(*path, *text);
            builder.add_document(project, *path, *text)
        })
        .collect();
    let (solution, _) = builder.build();
    let workspace = Workspace::new(solution, store.clone());
    (workspace, store, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::ProjectLoader;

    #[test]
    fn solution_fixture_loads() {
        let fixture = ProjectFixture::new();
        fixture.project("App");
        fixture.source("App", "Program.cs", "using System;\n");
        let sln = fixture.solution("All", &["App"]);

        let loaded = ProjectLoader::new(Arc::new(CSharpFrontEnd)).load(&sln).unwrap();
        assert_eq!(loaded.solution.len(), 1);
        assert!(!loaded.has_failures());
    }

    #[test]
    fn memory_workspace_assigns_ids_in_order() {
        let (ws, store, ids) = memory_workspace(&[("A.cs", "using A;\n"), ("B.cs", "")]);
        let solution = ws.current_solution();
        assert_eq!(solution.document(ids[1]).unwrap().path(), Path::new("B.cs"));
        assert_eq!(store.snapshot().len(), 2);
    }
}
