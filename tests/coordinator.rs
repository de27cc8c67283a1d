mod common;

use std::path::Path;
use std::sync::Arc;

use common::{ProjectFixture, memory_workspace};
use sharpfmt::FmtError;
use sharpfmt::format::{FormatOptions, StructuralFormatter, format_solution};
use sharpfmt::syntax::CSharpFrontEnd;
use sharpfmt::workspace::{
    ChangeCoordinator, ChangeSet, DocumentStore, FileSystemStore, ProjectLoader, Workspace,
};

const A: &str = "class A { void M() { if(x) { } } }\n";
const B: &str = "class B { void M() { while(y) { } } }\n";

fn formatted_changes(ws: &Workspace) -> ChangeSet {
    let outcome = format_solution(
        &StructuralFormatter,
        &ws.current_solution(),
        &FormatOptions::default(),
    );
    assert!(outcome.failures.is_empty());
    outcome.changes
}

#[test]
fn formatting_edits_commit_together() {
    let (ws, store, ids) = memory_workspace(&[("A.cs", A), ("B.cs", B)]);
    let changes = formatted_changes(&ws);
    assert_eq!(changes.len(), 2);

    let report = ChangeCoordinator::new(&ws)
        .apply(&ws.current_solution(), changes)
        .unwrap();

    assert_eq!(report.version, 1);
    assert_eq!(report.changed, ids);
    assert_eq!(
        store.read(Path::new("A.cs")).unwrap(),
        "class A { void M() { if (x) { } } }\n"
    );
    assert_eq!(
        store.read(Path::new("B.cs")).unwrap(),
        "class B { void M() { while (y) { } } }\n"
    );
}

#[test]
fn store_failure_leaves_both_documents_unchanged() {
    let (ws, store, _) = memory_workspace(&[("A.cs", A), ("B.cs", B)]);
    let base = ws.current_solution();
    let changes = formatted_changes(&ws);
    store.set_fail_writes(true);

    let err = ChangeCoordinator::new(&ws).apply(&base, changes).unwrap_err();

    assert!(matches!(err, FmtError::CommitRejected(_)));
    assert_eq!(store.read(Path::new("A.cs")).unwrap(), A);
    assert_eq!(store.read(Path::new("B.cs")).unwrap(), B);
    assert_eq!(ws.version(), 0);
    assert_eq!(ws.current_solution().document_ids().len(), 2);
}

#[test]
fn stale_base_is_rejected_without_writes() {
    let (ws, store, ids) = memory_workspace(&[("A.cs", A), ("B.cs", B)]);
    let stale = ws.current_solution();
    let changes = formatted_changes(&ws);

    let mut concurrent = ChangeSet::new();
    concurrent.insert(ids[0], "class A { }\n");
    ChangeCoordinator::new(&ws).apply(&stale, concurrent).unwrap();

    let err = ChangeCoordinator::new(&ws).apply(&stale, changes).unwrap_err();

    assert!(matches!(err, FmtError::CommitRejected(_)));
    assert_eq!(ws.version(), 1);
    assert_eq!(store.read(Path::new("A.cs")).unwrap(), "class A { }\n");
    assert_eq!(store.read(Path::new("B.cs")).unwrap(), B);
}

#[test]
fn unchanged_texts_are_not_written() {
    let (ws, _, ids) = memory_workspace(&[("A.cs", A)]);
    let mut changes = ChangeSet::new();
    changes.insert(ids[0], A);

    let report = ChangeCoordinator::new(&ws)
        .apply(&ws.current_solution(), changes)
        .unwrap();

    assert!(report.changed.is_empty());
    assert_eq!(ws.version(), 0);
}

#[test]
fn unknown_document_fails_staging() {
    let (ws, other_store, _) = memory_workspace(&[("A.cs", A)]);
    let mut changes = ChangeSet::new();
    changes.insert(sharpfmt::workspace::DocumentId::new(9), "class Z { }\n");

    let err = ChangeCoordinator::new(&ws)
        .apply(&ws.current_solution(), changes)
        .unwrap_err();

    assert!(matches!(err, FmtError::UnknownDocument(_)));
    assert_eq!(other_store.read(Path::new("A.cs")).unwrap(), A);
}

#[test]
fn file_system_commit_rewrites_every_file() {
    let fixture = ProjectFixture::new();
    let csproj = fixture.project("App");
    fixture.source("App", "A.cs", A);
    fixture.source("App", "Sub/B.cs", B);

    let loaded = ProjectLoader::new(Arc::new(CSharpFrontEnd)).load(&csproj).unwrap();
    assert_eq!(loaded.solution.len(), 2);
    let ws = Workspace::new(loaded.solution, Arc::new(FileSystemStore));
    let changes = formatted_changes(&ws);

    let report = ChangeCoordinator::new(&ws)
        .apply(&ws.current_solution(), changes)
        .unwrap();

    assert_eq!(report.changed.len(), 2);
    assert_eq!(fixture.read("App/A.cs"), "class A { void M() { if (x) { } } }\n");
    assert_eq!(fixture.read("App/Sub/B.cs"), "class B { void M() { while (y) { } } }\n");
}

#[cfg(unix)]
#[test]
fn file_system_commit_keeps_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = ProjectFixture::new();
    let csproj = fixture.project("App");
    let source = fixture.source("App", "A.cs", A);
    std::fs::set_permissions(&source, std::fs::Permissions::from_mode(0o644)).unwrap();

    let loaded = ProjectLoader::new(Arc::new(CSharpFrontEnd)).load(&csproj).unwrap();
    let ws = Workspace::new(loaded.solution, Arc::new(FileSystemStore));
    let changes = formatted_changes(&ws);
    ChangeCoordinator::new(&ws)
        .apply(&ws.current_solution(), changes)
        .unwrap();

    let mode = std::fs::metadata(&source).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
    assert_eq!(fixture.read("App/A.cs"), "class A { void M() { if (x) { } } }\n");
}
