//! Structured diagnostics fed back into the generation loop.
//!
//! Every failure mode of the validation stages — parse errors, runtime
//! faults, timeouts, contract violations, export violations — is represented
//! uniformly as a [`Diagnostic`] so the feedback controller never needs to
//! special-case a stage.

use serde::{Deserialize, Serialize};

use super::{REQUIRED_BINDING, REQUIRED_CAPABILITY};

/// Closed failure taxonomy for candidate programs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Candidate failed to parse. Always fatal to the attempt.
    Syntax,

    /// An exception escaped during execution of the candidate.
    RuntimeFault,

    /// The sandbox deadline elapsed and the worker was killed.
    ExecutionTimeout,

    /// Execution completed but never produced the required result binding.
    MissingResultBinding,

    /// The result binding lacks the structural-validation capability.
    MissingCapability,

    /// Invoking the structural validation raised a geometry-level fault.
    StructuralValidation,

    /// One or more expected export files were absent after execution.
    MissingExports,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DiagnosticKind::Syntax => "syntax",
            DiagnosticKind::RuntimeFault => "runtime_fault",
            DiagnosticKind::ExecutionTimeout => "execution_timeout",
            DiagnosticKind::MissingResultBinding => "missing_result_binding",
            DiagnosticKind::MissingCapability => "missing_capability",
            DiagnosticKind::StructuralValidation => "structural_validation",
            DiagnosticKind::MissingExports => "missing_exports",
        };
        f.write_str(s)
    }
}

/// One validation failure, with whatever location detail the stage could
/// recover, plus all warnings accumulated up to the point of failure.
///
/// Immutable once created; consumed by the feedback controller to build the
/// next generation prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    /// Which failure mode this is.
    pub kind: DiagnosticKind,

    /// Fault category name (e.g. "ZeroDivisionError"), when one exists.
    pub category: Option<String>,

    /// Rendered, human/LLM-readable failure message.
    pub message: String,

    /// 1-indexed failing line within the candidate text, when known.
    pub line: Option<u32>,

    /// Literal source line at `line`, trimmed, when known.
    pub source_line: Option<String>,

    /// Ordered warnings gathered across all stages before the failure.
    pub warnings: Vec<String>,
}

impl Diagnostic {
    fn new(kind: DiagnosticKind, message: String) -> Self {
        Self {
            kind,
            category: None,
            message,
            line: None,
            source_line: None,
            warnings: Vec::new(),
        }
    }

    /// Parse failure reported by the language front end.
    pub fn syntax(message: impl Into<String>, line: Option<u32>) -> Self {
        let message = message.into();
        let rendered = match line {
            Some(n) => format!("SyntaxError at line {n}: {message}"),
            None => format!("SyntaxError: {message}"),
        };
        let mut diag = Self::new(DiagnosticKind::Syntax, rendered);
        diag.category = Some("SyntaxError".to_string());
        diag.line = line;
        diag
    }

    /// Uncaught fault raised while executing the candidate.
    pub fn runtime_fault(
        category: impl Into<String>,
        message: impl Into<String>,
        line: Option<u32>,
        source_line: Option<String>,
    ) -> Self {
        let category = category.into();
        let message = message.into();
        let rendered = match (line, source_line.as_deref()) {
            (Some(n), Some(src)) => format!("{category} at line {n}: `{src}`: {message}"),
            (Some(n), None) => format!("{category} at line {n}: {message}"),
            _ => format!("{category}: {message}"),
        };
        let mut diag = Self::new(DiagnosticKind::RuntimeFault, rendered);
        diag.category = Some(category);
        diag.line = line;
        diag.source_line = source_line;
        diag
    }

    /// The sandbox deadline elapsed before the candidate finished.
    pub fn execution_timeout(limit_secs: u64) -> Self {
        Self::new(
            DiagnosticKind::ExecutionTimeout,
            format!("execution timed out after {limit_secs}s and was terminated"),
        )
    }

    /// Execution finished but the required binding was never assigned.
    pub fn missing_result_binding() -> Self {
        Self::new(
            DiagnosticKind::MissingResultBinding,
            format!(
                "No `{REQUIRED_BINDING}` object was created. \
                 The final CAD object must be assigned to `{REQUIRED_BINDING}`."
            ),
        )
    }

    /// The binding exists but lacks the structural-validation operation.
    pub fn missing_capability(binding_type: Option<&str>) -> Self {
        let mut diag = Self::new(
            DiagnosticKind::MissingCapability,
            format!(
                "`{REQUIRED_BINDING}` exists but does not have a \
                 `.{REQUIRED_CAPABILITY}()` method (invalid geometry)."
            ),
        );
        diag.category = binding_type.map(str::to_string);
        diag
    }

    /// The structural validation itself raised a geometry fault.
    pub fn structural_validation(category: impl Into<String>, message: impl Into<String>) -> Self {
        let category = category.into();
        let message = message.into();
        let mut diag = Self::new(
            DiagnosticKind::StructuralValidation,
            format!("Geometry error in `{REQUIRED_BINDING}.{REQUIRED_CAPABILITY}()`: {message}"),
        );
        diag.category = Some(category);
        diag
    }

    /// Expected export files absent after otherwise-successful execution.
    pub fn missing_exports(missing: &[String]) -> Self {
        Self::new(
            DiagnosticKind::MissingExports,
            format!("Missing exported files: {missing:?}"),
        )
    }

    /// Attach warnings accumulated from earlier stages.
    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
