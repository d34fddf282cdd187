//! Candidate program: one model-generated attempt at a CAD script.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An immutable candidate CAD script produced by the program generator.
///
/// The source text is treated as opaque by the pipeline — it is parsed and
/// executed by the sandbox worker, never mutated. Each candidate carries a
/// SHA-256 content digest used to correlate attempt records and logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateProgram {
    source: String,
    digest: String,
}

impl CandidateProgram {
    /// Wrap generated source text, computing its content digest.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self { source, digest }
    }

    /// The raw script text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Hex-encoded SHA-256 of the source text.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Short digest prefix for log lines.
    pub fn short_digest(&self) -> &str {
        &self.digest[..12]
    }

    /// Fetch a 1-indexed source line, trimmed, for diagnostics.
    pub fn line(&self, lineno: u32) -> Option<&str> {
        if lineno == 0 {
            return None;
        }
        self.source
            .lines()
            .nth(lineno as usize - 1)
            .map(str::trim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        let a = CandidateProgram::new("model = cq.Workplane()");
        let b = CandidateProgram::new("model = cq.Workplane()");
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn test_digest_changes_with_source() {
        let a = CandidateProgram::new("model = 1");
        let b = CandidateProgram::new("model = 2");
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_line_lookup_is_one_indexed() {
        let candidate = CandidateProgram::new("import cadquery as cq\n  model = cq.Workplane()\n");
        assert_eq!(candidate.line(1), Some("import cadquery as cq"));
        assert_eq!(candidate.line(2), Some("model = cq.Workplane()"));
        assert_eq!(candidate.line(0), None);
        assert_eq!(candidate.line(99), None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let candidate = CandidateProgram::new("model = cq.Workplane()");
        let json = serde_json::to_string(&candidate).expect("serialize");
        let back: CandidateProgram = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(candidate, back);
    }
}
