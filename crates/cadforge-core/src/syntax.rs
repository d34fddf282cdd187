//! Static validation: structural parse check plus advisory import scan.
//!
//! Nothing is executed at this stage. The candidate is handed to the sandbox
//! driver in check mode, which parses it with the scripting language's own
//! front end and scans top-level imports for the expected CAD library. A
//! missing import is advisory only — the candidate may alias or reach the
//! library indirectly — while any parse failure is fatal to the attempt.

use crate::domain::{CandidateProgram, Diagnostic};
use crate::sandbox::{SandboxError, SandboxResult, SandboxWorker, WorkerReport};

/// Result of the static validation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheck {
    /// Candidate parsed; advisory warnings carried forward.
    Parsed { warnings: Vec<String> },

    /// Candidate failed to parse; the attempt is over.
    Rejected(Diagnostic),
}

/// Statically validate a candidate without executing it.
pub async fn check_candidate(
    worker: &SandboxWorker,
    candidate: &CandidateProgram,
) -> SandboxResult<SyntaxCheck> {
    match worker.check(candidate).await? {
        WorkerReport::Parsed { warnings } => Ok(SyntaxCheck::Parsed { warnings }),
        WorkerReport::SyntaxError { message, line } => {
            Ok(SyntaxCheck::Rejected(Diagnostic::syntax(message, line)))
        }
        other => Err(SandboxError::Protocol {
            mode: "check",
            got: other.tag().to_string(),
        }),
    }
}
