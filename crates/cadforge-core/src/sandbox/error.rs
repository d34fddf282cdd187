//! Error types for the sandbox module.

/// Errors produced by the sandbox layer.
///
/// These are host-side failures. Candidate failures (syntax errors, runtime
/// faults) come back as [`WorkerReport`](super::report::WorkerReport)
/// variants, not errors — with one exception: [`SandboxError::Timeout`],
/// which the pipeline maps to the distinct `execution_timeout` diagnostic
/// kind because the killed worker can no longer report anything itself.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("execution timed out after {limit_secs}s; worker killed")]
    Timeout { limit_secs: u64 },

    #[error("worker exited without writing a report")]
    MissingReport,

    #[error("malformed worker report: {0}")]
    MalformedReport(#[from] serde_json::Error),

    #[error("worker environment failure: {message}")]
    Environment { message: String },

    #[error("unexpected worker report in {mode} mode: {got}")]
    Protocol { mode: &'static str, got: String },

    #[error("invalid sandbox configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sandbox operations.
pub type SandboxResult<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_limit() {
        let err = SandboxError::Timeout { limit_secs: 60 };
        assert!(err.to_string().contains("60s"));
    }

    #[test]
    fn test_protocol_display() {
        let err = SandboxError::Protocol {
            mode: "check",
            got: "completed".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("check"));
        assert!(msg.contains("completed"));
    }
}
