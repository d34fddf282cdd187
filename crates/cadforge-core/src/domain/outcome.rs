//! Validation outcome: the central contract of the loop.
//!
//! Every checking stage either advances toward `Valid` or short-circuits to
//! `Invalid` with a [`Diagnostic`] attached. The ordering of checks is
//! significant — a parse error must never be reported as an execution error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;

/// Opaque summary of a successfully produced artifact.
///
/// The postcondition checker treats the artifact polymorphically — it records
/// the binding's reported type name and the export paths, and never
/// interprets the geometry itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactReport {
    /// Type name the sandbox reported for the result binding.
    pub binding_type: String,

    /// Absolute paths of the export files confirmed on disk.
    pub exports: Vec<PathBuf>,

    /// Warnings accumulated across all stages of the successful attempt.
    pub warnings: Vec<String>,
}

/// Tagged result of validating one candidate program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid(ArtifactReport),
    Invalid(Diagnostic),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    /// The diagnostic, when invalid.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ValidationOutcome::Invalid(diag) => Some(diag),
            ValidationOutcome::Valid(_) => None,
        }
    }

    /// Warnings carried by either arm.
    pub fn warnings(&self) -> &[String] {
        match self {
            ValidationOutcome::Valid(report) => &report.warnings,
            ValidationOutcome::Invalid(diag) => &diag.warnings,
        }
    }
}

/// Flat diagnostic contract surfaced upstream of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutcomeSummary {
    pub is_valid: bool,
    pub error_message: Option<String>,
    pub failing_line: Option<u32>,
    pub warnings: Vec<String>,
}

impl From<&ValidationOutcome> for OutcomeSummary {
    fn from(outcome: &ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Valid(report) => Self {
                is_valid: true,
                error_message: None,
                failing_line: None,
                warnings: report.warnings.clone(),
            },
            ValidationOutcome::Invalid(diag) => Self {
                is_valid: false,
                error_message: Some(diag.message.clone()),
                failing_line: diag.line,
                warnings: diag.warnings.clone(),
            },
        }
    }
}
