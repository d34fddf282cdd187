//! End-to-end sandbox tests: static checks, execution faults, postconditions.

mod common;

use cadforge_core::{
    check_candidate, evaluate_postconditions, CandidateProgram, DiagnosticKind, SandboxError,
    SandboxWorker, SyntaxCheck, ValidationOutcome, WorkerReport, EXPECTED_EXPORT_FILES,
};

use common::{python_missing, stub_sandbox};

fn worker(dir: &std::path::Path) -> SandboxWorker {
    SandboxWorker::new(stub_sandbox(dir)).expect("valid sandbox config")
}

// -------------------------------------------------------------------------
// Static validation
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_syntax_error_reports_failing_line() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new("model = cq.make_cube()\nmodel = = 5\n");
    match check_candidate(&worker, &candidate).await.expect("check") {
        SyntaxCheck::Rejected(diag) => {
            assert_eq!(diag.kind, DiagnosticKind::Syntax);
            assert_eq!(diag.line, Some(2));
            assert!(diag.message.contains("SyntaxError at line 2"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_import_is_advisory_only() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new("model = cq.make_cube()\n");
    match check_candidate(&worker, &candidate).await.expect("check") {
        SyntaxCheck::Parsed { warnings } => {
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].contains("CadQuery import not found"));
        }
        other => panic!("expected Parsed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cadquery_import_silences_the_warning() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate =
        CandidateProgram::new("import cadquery as cq\nmodel = cq.Workplane(\"XY\").box(1, 1, 1)\n");
    match check_candidate(&worker, &candidate).await.expect("check") {
        SyntaxCheck::Parsed { warnings } => assert!(warnings.is_empty()),
        other => panic!("expected Parsed, got {other:?}"),
    }
}

// -------------------------------------------------------------------------
// Execution
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_valid_candidate_round_trip() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new(
        "model = cq.make_cube()\n\
         cq.export(model, \"object.stl\")\n\
         cq.export(model, \"object.step\")\n",
    );
    let report = worker.execute(&candidate).await.expect("execute");
    let (warnings, binding) = match report {
        WorkerReport::Completed { warnings, binding } => (warnings, binding),
        other => panic!("expected Completed, got {other:?}"),
    };
    assert!(binding.present);
    assert!(binding.has_capability);
    assert!(binding.capability_error.is_none());

    let outcome = evaluate_postconditions(&binding, dir.path(), warnings);
    match outcome {
        ValidationOutcome::Valid(artifact) => {
            assert_eq!(artifact.binding_type, "Solid");
            for path in &artifact.exports {
                assert!(path.is_file(), "{} should exist", path.display());
            }
        }
        other => panic!("expected Valid, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fault_reports_deepest_candidate_frame() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new(
        "def inner(x):\n    return 1 / x\n\ndef outer():\n    return inner(0)\n\nvalue = outer()\n",
    );
    match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Fault {
            category,
            line,
            source_line,
            ..
        } => {
            assert_eq!(category, "ZeroDivisionError");
            assert_eq!(line, Some(2));
            assert_eq!(source_line.as_deref(), Some("return 1 / x"));
        }
        other => panic!("expected Fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_division_by_zero_on_line_seven() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new(
        "a = 1\n\
         b = 2\n\
         c = 3\n\
         d = 4\n\
         e = 5\n\
         f = 6\n\
         g = a / 0\n",
    );
    match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Fault { category, line, .. } => {
            assert_eq!(category, "ZeroDivisionError");
            assert_eq!(line, Some(7));
        }
        other => panic!("expected Fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_runtime_warnings_are_captured() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new(
        "import warnings\n\
         warnings.warn(\"deprecated fillet call\")\n\
         model = cq.make_cube()\n",
    );
    match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Completed { warnings, .. } => {
            assert!(warnings.iter().any(|w| w.contains("deprecated fillet call")));
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_infinite_loop_hits_the_deadline() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let config = stub_sandbox(dir.path()).with_timeout_secs(1);
    let worker = SandboxWorker::new(config).expect("valid sandbox config");

    let candidate = CandidateProgram::new("while True:\n    pass\n");
    match worker.execute(&candidate).await {
        Err(SandboxError::Timeout { limit_secs }) => assert_eq!(limit_secs, 1),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

// -------------------------------------------------------------------------
// Postconditions against real side effects
// -------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_binding_wins_over_files_on_disk() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    // Writes both files but never assigns `model`.
    let candidate = CandidateProgram::new(
        "thing = cq.make_cube()\n\
         cq.export(thing, \"object.stl\")\n\
         cq.export(thing, \"object.step\")\n",
    );
    let (warnings, binding) = match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Completed { warnings, binding } => (warnings, binding),
        other => panic!("expected Completed, got {other:?}"),
    };
    assert!(!binding.present);

    let outcome = evaluate_postconditions(&binding, dir.path(), warnings);
    let diag = outcome.diagnostic().expect("invalid");
    assert_eq!(diag.kind, DiagnosticKind::MissingResultBinding);
}

#[tokio::test]
async fn test_stale_exports_do_not_satisfy_postconditions() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    // Leftovers from a prior successful attempt.
    for name in EXPECTED_EXPORT_FILES {
        std::fs::write(dir.path().join(name), b"stale solid").expect("write stale");
    }

    // This attempt produces a model but writes nothing.
    let candidate = CandidateProgram::new("model = cq.make_cube()\n");
    let (warnings, binding) = match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Completed { warnings, binding } => (warnings, binding),
        other => panic!("expected Completed, got {other:?}"),
    };

    let outcome = evaluate_postconditions(&binding, dir.path(), warnings);
    let diag = outcome.diagnostic().expect("invalid");
    assert_eq!(diag.kind, DiagnosticKind::MissingExports);
    for name in EXPECTED_EXPORT_FILES {
        assert!(
            !dir.path().join(name).exists(),
            "stale {name} must be gone before execution"
        );
    }
}

#[tokio::test]
async fn test_result_without_capability() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new("model = 42\n");
    let (warnings, binding) = match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Completed { warnings, binding } => (warnings, binding),
        other => panic!("expected Completed, got {other:?}"),
    };
    assert!(binding.present);
    assert!(!binding.has_capability);

    let outcome = evaluate_postconditions(&binding, dir.path(), warnings);
    let diag = outcome.diagnostic().expect("invalid");
    assert_eq!(diag.kind, DiagnosticKind::MissingCapability);
}

#[tokio::test]
async fn test_structural_validation_fault() {
    if python_missing() {
        return;
    }
    let dir = tempfile::tempdir().expect("tempdir");
    let worker = worker(dir.path());

    let candidate = CandidateProgram::new(
        "model = cq.make_broken()\n\
         cq.export(model, \"object.stl\")\n\
         cq.export(model, \"object.step\")\n",
    );
    let (warnings, binding) = match worker.execute(&candidate).await.expect("execute") {
        WorkerReport::Completed { warnings, binding } => (warnings, binding),
        other => panic!("expected Completed, got {other:?}"),
    };
    let fault = binding.capability_error.as_ref().expect("capability fault");
    assert_eq!(fault.category, "ValueError");

    let outcome = evaluate_postconditions(&binding, dir.path(), warnings);
    let diag = outcome.diagnostic().expect("invalid");
    assert_eq!(diag.kind, DiagnosticKind::StructuralValidation);
    assert!(diag.message.contains("degenerate geometry"));
}
