//! Sandbox configuration.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use super::error::{SandboxError, SandboxResult};

/// Configuration for sandboxed candidate execution.
///
/// Single-tenancy constraint: the expected export filenames are fixed,
/// process-relative paths inside `workdir`. Exactly one execution may be in
/// flight per working directory; a host that needs concurrent attempts must
/// allocate a distinct scratch `workdir` per attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SandboxConfig {
    /// Interpreter binary used to run the driver.
    pub python_bin: PathBuf,

    /// Module imported and injected into the candidate namespace.
    pub cad_module: String,

    /// Name the module is bound to inside the namespace.
    pub cad_alias: String,

    /// Working directory the candidate writes its exports into.
    pub workdir: PathBuf,

    /// Hard wall-clock deadline for one execution (seconds).
    pub timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            python_bin: PathBuf::from("python3"),
            cad_module: "cadquery".to_string(),
            cad_alias: "cq".to_string(),
            workdir: PathBuf::from("."),
            timeout_secs: 60,
        }
    }
}

impl SandboxConfig {
    /// Config rooted at the given working directory, defaults elsewhere.
    pub fn in_workdir(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            ..Self::default()
        }
    }

    /// Override the injected module and alias (used by tests to point the
    /// sandbox at a stub CAD library).
    pub fn with_cad_module(mut self, module: impl Into<String>, alias: impl Into<String>) -> Self {
        self.cad_module = module.into();
        self.cad_alias = alias.into();
        self
    }

    /// Override the execution deadline.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Reject configurations the worker cannot honor.
    pub fn validate(&self) -> SandboxResult<()> {
        if self.timeout_secs == 0 {
            return Err(SandboxError::InvalidConfig(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.cad_module.is_empty() || self.cad_alias.is_empty() {
            return Err(SandboxError::InvalidConfig(
                "cad_module and cad_alias must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Whether the configured interpreter can be spawned at all.
///
/// Used to gate integration tests on hosts without a Python toolchain.
pub fn python_available(python_bin: &Path) -> bool {
    Command::new(python_bin)
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}
