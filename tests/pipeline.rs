mod common;

use std::path::Path;
use std::sync::Arc;

use common::{ProjectFixture, memory_workspace};
use sharpfmt::FmtError;
use sharpfmt::format::{FormatOptions, StructuralFormatter};
use sharpfmt::lint::{LintConfig, LintEngine, OrderComparator, all_rules};
use sharpfmt::pipeline::{Run, RunState};
use sharpfmt::syntax::{CSharpFrontEnd, LoadDiagnostic};
use sharpfmt::test_utils::capture_logs;
use sharpfmt::workspace::{DocumentStore, FileSystemStore, ProjectLoader, Workspace};

fn engine() -> LintEngine {
    let mut engine = LintEngine::new(LintConfig::default());
    for rule in all_rules(&OrderComparator::external_first(), &FormatOptions::default()) {
        engine.register(rule);
    }
    engine
}

#[test]
fn load_failure_stops_before_analysis() {
    let (ws, _, _) = memory_workspace(&[("A.cs", "using A;\n")]);
    let diagnostics = [LoadDiagnostic::failure("project 'Missing' not found")];
    let err = Run::start(&ws, &diagnostics).err().unwrap();
    assert!(matches!(err, FmtError::LoadFailed(ref msg) if msg.contains("Missing")));
}

#[test]
fn load_warnings_are_logged_and_tolerated() {
    let (ws, _, _) = memory_workspace(&[("A.cs", "using A;\n")]);
    let diagnostics = [LoadDiagnostic::warning("odd project file")];
    let (run, logs) = capture_logs(|| Run::start(&ws, &diagnostics));
    assert_eq!(run.unwrap().state(), RunState::Loaded);
    assert!(logs.contains("load warning"));
}

#[test]
fn analyze_then_commit_without_edits_changes_nothing() {
    let (ws, store, _) = memory_workspace(&[("A.cs", "using B;\nusing A;\n")]);
    let mut run = Run::start(&ws, &[]).unwrap();
    assert_eq!(run.analyze(&engine()).unwrap().error_count(), 1);
    assert_eq!(run.state(), RunState::Analyzed);
    assert!(run.pending_changes().is_empty());

    let report = run.commit().unwrap();
    assert!(report.changed.is_empty());
    assert_eq!(run.state(), RunState::Committed);
    assert_eq!(store.read(Path::new("A.cs")).unwrap(), "using B;\nusing A;\n");
}

#[test]
fn illegal_transitions_are_refused() {
    let (ws, _, _) = memory_workspace(&[("A.cs", "class A { }\n")]);
    let mut run = Run::start(&ws, &[]).unwrap();

    assert!(matches!(
        run.format(&StructuralFormatter, &FormatOptions::default()),
        Err(FmtError::InvalidState(_))
    ));
    assert!(matches!(run.commit(), Err(FmtError::InvalidState(_))));

    run.analyze(&engine()).unwrap();
    assert!(matches!(run.analyze(&engine()), Err(FmtError::InvalidState(_))));
    run.commit().unwrap();
    assert!(matches!(run.fix(&engine()), Err(FmtError::InvalidState(_))));
}

#[test]
fn fix_and_format_stage_into_one_commit() {
    let text = "using Alpha;\nusing System;\nclass C { void M() { foreach(var x in y) { } } }  \n";
    let (ws, store, ids) = memory_workspace(&[("A.cs", text), ("B.cs", "class B { }\n")]);
    let mut run = Run::start(&ws, &[]).unwrap();
    run.analyze(&engine()).unwrap();

    let fixed = run.fix(&engine()).unwrap();
    assert_eq!(fixed.changed, vec![ids[0]]);
    let formatted = run.format(&StructuralFormatter, &FormatOptions::default()).unwrap();
    assert!(formatted.changed.is_empty());
    assert_eq!(run.state(), RunState::Edited);
    assert_eq!(run.pending_changes().len(), 1);

    let report = run.commit().unwrap();
    assert_eq!(report.version, 1);
    assert_eq!(
        store.read(Path::new("A.cs")).unwrap(),
        "using System;\nusing Alpha;\nclass C { void M() { foreach (var x in y) { } } }\n"
    );
    assert_eq!(store.read(Path::new("B.cs")).unwrap(), "class B { }\n");
}

#[test]
fn rejected_commit_ends_the_run() {
    let (ws, store, _) = memory_workspace(&[("A.cs", "class A { void M() { if(x) { } } }\n")]);
    let mut run = Run::start(&ws, &[]).unwrap();
    run.analyze(&engine()).unwrap();
    run.format(&StructuralFormatter, &FormatOptions::default()).unwrap();

    store.set_fail_writes(true);
    assert!(matches!(run.commit(), Err(FmtError::CommitRejected(_))));
    assert_eq!(run.state(), RunState::Rejected);
    assert!(matches!(run.commit(), Err(FmtError::InvalidState(_))));
    assert_eq!(
        store.read(Path::new("A.cs")).unwrap(),
        "class A { void M() { if(x) { } } }\n"
    );
}

#[test]
fn unparsable_document_is_skipped_not_fatal() {
    let (ws, store, ids) = memory_workspace(&[
        ("A.cs", "class A { void M() { if(x) { } }\n"),
        ("B.cs", "class B { void M() { if(x) { } } }\n"),
    ]);
    let mut run = Run::start(&ws, &[]).unwrap();
    let report = run.analyze(&engine()).unwrap();
    assert!(report.failures.iter().all(|f| f.document == ids[0]));
    assert!(!report.failures.is_empty());

    let formatted = run.format(&StructuralFormatter, &FormatOptions::default()).unwrap();
    assert_eq!(formatted.changed, vec![ids[1]]);
    assert_eq!(formatted.skipped.len(), 1);
    run.commit().unwrap();

    assert_eq!(
        store.read(Path::new("A.cs")).unwrap(),
        "class A { void M() { if(x) { } }\n"
    );
    assert_eq!(
        store.read(Path::new("B.cs")).unwrap(),
        "class B { void M() { if (x) { } } }\n"
    );
}

#[test]
fn solution_on_disk_round_trip() {
    let fixture = ProjectFixture::new();
    fixture.project("Core");
    fixture.source("Core", "Math.cs", "using System.Linq;\nusing System;\nclass M { }\n");
    fixture.project("Web");
    fixture.source("Web", "Api.cs", "namespace Web\n{\n    using Core;\n    using Alpha;\n}\n");
    let sln = fixture.solution("All", &["Core", "Web"]);

    let loaded = ProjectLoader::new(Arc::new(CSharpFrontEnd)).load(&sln).unwrap();
    let ws = Workspace::new(loaded.solution, Arc::new(FileSystemStore));
    let mut run = Run::start(&ws, &loaded.diagnostics).unwrap();
    assert_eq!(run.analyze(&engine()).unwrap().error_count(), 2);
    run.fix(&engine()).unwrap();
    run.commit().unwrap();

    assert_eq!(fixture.read("Core/Math.cs"), "using System;\nusing System.Linq;\nclass M { }\n");
    assert_eq!(
        fixture.read("Web/Api.cs"),
        "namespace Web\n{\n    using Alpha;\n    using Core;\n}\n"
    );
}
