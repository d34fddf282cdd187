//! CadForge Core
//!
//! The generate → statically check → execute → verify → feedback loop that
//! turns model-generated CAD scripts into validated, exported artifacts.

pub mod domain;
pub mod export;
pub mod pipeline;
pub mod postcondition;
pub mod sandbox;
pub mod syntax;
pub mod telemetry;

pub use domain::{
    ArtifactReport, CadForgeError, CandidateProgram, Diagnostic, DiagnosticKind, OutcomeSummary,
    Result, ValidationOutcome, EXPECTED_EXPORT_FILES, REQUIRED_BINDING, REQUIRED_CAPABILITY,
};

pub use export::{archive_exports, archive_stem};
pub use pipeline::{
    AttemptRecord, GenerationPipeline, GenerationRequest, GeneratorError, PipelineError,
    PipelineStage, PipelineSuccess, PriorAttempt, ProgramGenerator, RetryPolicy,
};
pub use postcondition::evaluate as evaluate_postconditions;
pub use sandbox::{
    python_available, BindingReport, CapabilityFault, SandboxConfig, SandboxError, SandboxResult,
    SandboxWorker, WorkerReport,
};
pub use syntax::{check_candidate, SyntaxCheck};
pub use telemetry::init_tracing;

/// CadForge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
