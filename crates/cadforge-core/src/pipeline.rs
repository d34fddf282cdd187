//! Feedback/retry controller for the generate → validate loop.
//!
//! Drives one run through the states
//! `Generate → StaticCheck → Execute → PostconditionCheck → Success`,
//! routing any failure through `Feedback`: the prior candidate text and its
//! [`Diagnostic`] are handed back to the program generator for the next
//! attempt. The loop is bounded by [`RetryPolicy`]; exhaustion surfaces the
//! final diagnostic as a typed error together with the full attempt log.
//!
//! Model-boundary failures (HTTP, auth, malformed completions) abort the run
//! instead of consuming retries — regeneration cannot fix infrastructure.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{ArtifactReport, CandidateProgram, Diagnostic, ValidationOutcome};
use crate::postcondition;
use crate::sandbox::{SandboxConfig, SandboxError, SandboxResult, SandboxWorker, WorkerReport};
use crate::syntax::{check_candidate, SyntaxCheck};

/// Failure at the program-generator boundary.
#[derive(Debug, thiserror::Error)]
#[error("program generation failed: {0}")]
pub struct GeneratorError(pub String);

/// The previous attempt, fed back into the next generation prompt.
#[derive(Debug, Clone, Copy)]
pub struct PriorAttempt<'a> {
    /// Full source text of the rejected candidate.
    pub program: &'a str,

    /// Why it was rejected.
    pub diagnostic: &'a Diagnostic,
}

/// One generation request: the design instructions plus, on retries, the
/// structured feedback from the failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub instructions: &'a str,
    pub attempt: u32,
    pub prior: Option<PriorAttempt<'a>>,
}

/// Produces candidate CAD scripts from design instructions.
#[async_trait]
pub trait ProgramGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, GeneratorError>;
}

/// States of the control loop. Recorded on attempt records to show where an
/// attempt stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Generate,
    StaticCheck,
    Execute,
    PostconditionCheck,
    Feedback,
    Success,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Generate => "generate",
            PipelineStage::StaticCheck => "static_check",
            PipelineStage::Execute => "execute",
            PipelineStage::PostconditionCheck => "postcondition_check",
            PipelineStage::Feedback => "feedback",
            PipelineStage::Success => "success",
        };
        f.write_str(s)
    }
}

/// Bounded retry policy for the loop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum candidate attempts before the run fails.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Attempt ceiling, clamped to at least one.
    pub fn bounded(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// One attempt in the run log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub candidate_digest: String,

    /// Stage the attempt failed at; `None` on the successful attempt.
    pub failed_stage: Option<PipelineStage>,

    /// Diagnostic produced by the failed stage; `None` on success.
    pub diagnostic: Option<Diagnostic>,

    pub duration_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

/// Terminal success: the validated program, its artifact summary, and the
/// full attempt log, ready for the downstream export/critique collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSuccess {
    pub run_id: String,
    pub program: CandidateProgram,
    pub artifact: ArtifactReport,
    pub attempts: Vec<AttemptRecord>,
    pub duration_ms: u64,
}

/// Terminal failure modes of a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("sandbox failure: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("failed to produce a valid CAD program after {attempts} attempt(s): {last}")]
    ExhaustedRetries {
        attempts: u32,
        last: Diagnostic,
        records: Vec<AttemptRecord>,
    },
}

/// The generate/validate/retry orchestrator.
pub struct GenerationPipeline<G> {
    generator: G,
    worker: SandboxWorker,
    policy: RetryPolicy,
}

impl<G: ProgramGenerator> GenerationPipeline<G> {
    /// Build a pipeline, validating the sandbox configuration up front.
    pub fn new(generator: G, sandbox: SandboxConfig) -> SandboxResult<Self> {
        Ok(Self {
            generator,
            worker: SandboxWorker::new(sandbox)?,
            policy: RetryPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn worker(&self) -> &SandboxWorker {
        &self.worker
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run the full loop for one set of design instructions.
    pub async fn run(&self, instructions: &str) -> Result<PipelineSuccess, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let max_attempts = self.policy.bounded();

        let mut records: Vec<AttemptRecord> = Vec::new();
        let mut prior: Option<(String, Diagnostic)> = None;

        info!(run_id = %run_id, max_attempts, "starting generation run");

        for attempt in 1..=max_attempts {
            let attempt_started = Instant::now();
            let request = GenerationRequest {
                instructions,
                attempt,
                prior: prior.as_ref().map(|(program, diagnostic)| PriorAttempt {
                    program: program.as_str(),
                    diagnostic,
                }),
            };

            let source = self.generator.generate(request).await?;
            let candidate = CandidateProgram::new(source);
            info!(
                run_id = %run_id,
                attempt,
                candidate = %candidate.short_digest(),
                "candidate generated"
            );

            let (stage, outcome) = self.validate(&candidate).await?;
            let duration_ms = attempt_started.elapsed().as_millis() as u64;

            match outcome {
                ValidationOutcome::Valid(artifact) => {
                    records.push(AttemptRecord {
                        attempt,
                        candidate_digest: candidate.digest().to_string(),
                        failed_stage: None,
                        diagnostic: None,
                        duration_ms,
                        recorded_at: Utc::now(),
                    });
                    let duration_ms = started.elapsed().as_millis() as u64;
                    info!(
                        run_id = %run_id,
                        attempts = attempt,
                        duration_ms,
                        "generation run succeeded"
                    );
                    return Ok(PipelineSuccess {
                        run_id,
                        program: candidate,
                        artifact,
                        attempts: records,
                        duration_ms,
                    });
                }
                ValidationOutcome::Invalid(diagnostic) => {
                    warn!(
                        run_id = %run_id,
                        attempt,
                        stage = %stage,
                        kind = %diagnostic.kind,
                        line = diagnostic.line,
                        "attempt rejected, routing to feedback"
                    );
                    records.push(AttemptRecord {
                        attempt,
                        candidate_digest: candidate.digest().to_string(),
                        failed_stage: Some(stage),
                        diagnostic: Some(diagnostic.clone()),
                        duration_ms,
                        recorded_at: Utc::now(),
                    });
                    prior = Some((candidate.source().to_string(), diagnostic));
                }
            }
        }

        let last = prior
            .map(|(_, diagnostic)| diagnostic)
            .expect("bounded() guarantees at least one attempt");
        warn!(run_id = %run_id, attempts = max_attempts, "generation run exhausted retries");
        Err(PipelineError::ExhaustedRetries {
            attempts: max_attempts,
            last,
            records,
        })
    }

    /// Validate one candidate through the checking stages.
    ///
    /// Short-circuit ordering is significant: a parse error must never be
    /// reported as an execution error, and contract violations are only
    /// evaluated after a fault-free run.
    async fn validate(
        &self,
        candidate: &CandidateProgram,
    ) -> Result<(PipelineStage, ValidationOutcome), PipelineError> {
        let warnings = match check_candidate(&self.worker, candidate).await? {
            SyntaxCheck::Rejected(diagnostic) => {
                return Ok((
                    PipelineStage::StaticCheck,
                    ValidationOutcome::Invalid(diagnostic),
                ));
            }
            SyntaxCheck::Parsed { warnings } => warnings,
        };

        let report = match self.worker.execute(candidate).await {
            Ok(report) => report,
            Err(SandboxError::Timeout { limit_secs }) => {
                return Ok((
                    PipelineStage::Execute,
                    ValidationOutcome::Invalid(
                        Diagnostic::execution_timeout(limit_secs).with_warnings(warnings),
                    ),
                ));
            }
            Err(err) => return Err(err.into()),
        };

        match report {
            WorkerReport::Fault {
                category,
                message,
                line,
                source_line,
                warnings: runtime_warnings,
            } => {
                let mut all_warnings = warnings;
                all_warnings.extend(runtime_warnings);
                Ok((
                    PipelineStage::Execute,
                    ValidationOutcome::Invalid(
                        Diagnostic::runtime_fault(category, message, line, source_line)
                            .with_warnings(all_warnings),
                    ),
                ))
            }
            WorkerReport::Completed {
                warnings: runtime_warnings,
                binding,
            } => {
                let mut all_warnings = warnings;
                all_warnings.extend(runtime_warnings);
                Ok((
                    PipelineStage::PostconditionCheck,
                    postcondition::evaluate(&binding, &self.worker.config().workdir, all_warnings),
                ))
            }
            other => Err(SandboxError::Protocol {
                mode: "run",
                got: other.tag().to_string(),
            }
            .into()),
        }
    }
}
