//! Postcondition checks over a completed execution.
//!
//! Given the binding report from a successful run and the working directory,
//! verifies in order: the required binding exists, it exposes the structural
//! validation capability, invoking that capability raised no fault, and every
//! expected export file is on disk. Checks short-circuit on first failure,
//! and warnings accumulated from earlier stages always travel into whichever
//! result is returned.

use std::path::Path;

use crate::domain::{
    ArtifactReport, Diagnostic, ValidationOutcome, EXPECTED_EXPORT_FILES,
};
use crate::sandbox::BindingReport;

/// Evaluate the postconditions of one completed execution.
pub fn evaluate(
    binding: &BindingReport,
    workdir: &Path,
    warnings: Vec<String>,
) -> ValidationOutcome {
    if !binding.present {
        return ValidationOutcome::Invalid(
            Diagnostic::missing_result_binding().with_warnings(warnings),
        );
    }

    if !binding.has_capability {
        return ValidationOutcome::Invalid(
            Diagnostic::missing_capability(binding.type_name.as_deref()).with_warnings(warnings),
        );
    }

    if let Some(fault) = &binding.capability_error {
        return ValidationOutcome::Invalid(
            Diagnostic::structural_validation(fault.category.clone(), fault.message.clone())
                .with_warnings(warnings),
        );
    }

    let missing: Vec<String> = EXPECTED_EXPORT_FILES
        .iter()
        .filter(|name| !workdir.join(name).is_file())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return ValidationOutcome::Invalid(
            Diagnostic::missing_exports(&missing).with_warnings(warnings),
        );
    }

    ValidationOutcome::Valid(ArtifactReport {
        binding_type: binding
            .type_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        exports: EXPECTED_EXPORT_FILES
            .iter()
            .map(|name| workdir.join(name))
            .collect(),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiagnosticKind;
    use crate::sandbox::CapabilityFault;

    fn healthy_binding() -> BindingReport {
        BindingReport {
            present: true,
            type_name: Some("Workplane".to_string()),
            has_capability: true,
            capability_error: None,
        }
    }

    fn write_exports(dir: &Path) {
        for name in EXPECTED_EXPORT_FILES {
            std::fs::write(dir.join(name), b"solid").expect("write export");
        }
    }

    #[test]
    fn test_missing_binding_fails_first_even_with_files_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_exports(dir.path());
        let binding = BindingReport {
            present: false,
            type_name: None,
            has_capability: false,
            capability_error: None,
        };
        let outcome = evaluate(&binding, dir.path(), vec![]);
        let diag = outcome.diagnostic().expect("invalid");
        assert_eq!(diag.kind, DiagnosticKind::MissingResultBinding);
    }

    #[test]
    fn test_missing_capability() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binding = BindingReport {
            present: true,
            type_name: Some("int".to_string()),
            has_capability: false,
            capability_error: None,
        };
        let outcome = evaluate(&binding, dir.path(), vec![]);
        let diag = outcome.diagnostic().expect("invalid");
        assert_eq!(diag.kind, DiagnosticKind::MissingCapability);
        assert_eq!(diag.category.as_deref(), Some("int"));
    }

    #[test]
    fn test_capability_fault_maps_to_structural_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_exports(dir.path());
        let binding = BindingReport {
            capability_error: Some(CapabilityFault {
                category: "StdFail_NotDone".to_string(),
                message: "BRep_API: command not done".to_string(),
            }),
            ..healthy_binding()
        };
        let outcome = evaluate(&binding, dir.path(), vec![]);
        let diag = outcome.diagnostic().expect("invalid");
        assert_eq!(diag.kind, DiagnosticKind::StructuralValidation);
        assert!(diag.message.contains("BRep_API"));
    }

    #[test]
    fn test_missing_exports_lists_only_absent_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("object.stl"), b"solid").expect("write");
        let outcome = evaluate(&healthy_binding(), dir.path(), vec![]);
        let diag = outcome.diagnostic().expect("invalid");
        assert_eq!(diag.kind, DiagnosticKind::MissingExports);
        assert!(diag.message.contains("object.step"));
        assert!(!diag.message.contains("[\"object.stl\""));
    }

    #[test]
    fn test_all_postconditions_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_exports(dir.path());
        let warnings = vec!["deprecated API".to_string()];
        let outcome = evaluate(&healthy_binding(), dir.path(), warnings.clone());
        match outcome {
            ValidationOutcome::Valid(report) => {
                assert_eq!(report.binding_type, "Workplane");
                assert_eq!(report.exports.len(), 2);
                assert_eq!(report.warnings, warnings);
            }
            other => panic!("expected Valid, got {other:?}"),
        }
    }

    #[test]
    fn test_warnings_carried_into_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let binding = BindingReport {
            present: false,
            type_name: None,
            has_capability: false,
            capability_error: None,
        };
        let outcome = evaluate(&binding, dir.path(), vec!["w".to_string()]);
        assert_eq!(outcome.warnings(), ["w".to_string()]);
    }
}
