//! Domain-level error taxonomy for CadForge.
//!
//! These are host errors: infrastructure failures that abort a run. Candidate
//! failures are never represented here — they travel as [`Diagnostic`] values
//! through the feedback loop instead.
//!
//! [`Diagnostic`]: super::diagnostic::Diagnostic

/// CadForge domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CadForgeError {
    #[error("sandbox error: {0}")]
    Sandbox(#[from] crate::sandbox::SandboxError),

    #[error("export archiving failed: {0}")]
    Export(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for CadForge domain operations.
pub type Result<T> = std::result::Result<T, CadForgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_error_display() {
        let err = CadForgeError::Export("object.stl vanished".to_string());
        assert!(err.to_string().contains("export archiving failed"));
        assert!(err.to_string().contains("object.stl vanished"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CadForgeError = io.into();
        assert!(err.to_string().contains("io error"));
    }
}
