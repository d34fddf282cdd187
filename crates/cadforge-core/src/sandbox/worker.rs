//! Sandbox worker: drives one interpreter process per invocation.

use std::process::Stdio;
use std::time::Duration;

use std::path::PathBuf;

use tokio::process::Command;
use tracing::debug;

use super::config::SandboxConfig;
use super::error::{SandboxError, SandboxResult};
use super::report::WorkerReport;
use crate::domain::{CandidateProgram, EXPECTED_EXPORT_FILES};

/// Driver script shipped to a scratch directory on every invocation.
const DRIVER_SOURCE: &str = include_str!("../../python/sandbox_runner.py");

/// Spawns the sandbox driver against candidate programs.
///
/// Each invocation gets a fresh scratch directory holding the driver, the
/// candidate text, and the report file; the process runs with the configured
/// working directory as CWD and is killed when the deadline elapses
/// (`kill_on_drop` guarantees no orphaned interpreter survives a timeout).
#[derive(Debug)]
pub struct SandboxWorker {
    config: SandboxConfig,
}

impl SandboxWorker {
    /// Build a worker, rejecting invalid configuration up front.
    pub fn new(config: SandboxConfig) -> SandboxResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Absolute paths of the expected export files in the working directory.
    pub fn expected_export_paths(&self) -> Vec<PathBuf> {
        EXPECTED_EXPORT_FILES
            .iter()
            .map(|name| self.config.workdir.join(name))
            .collect()
    }

    /// Parse-only validation of the candidate (check mode, no execution).
    pub async fn check(&self, candidate: &CandidateProgram) -> SandboxResult<WorkerReport> {
        self.invoke("check", candidate).await
    }

    /// Execute the candidate (run mode).
    ///
    /// Stale expected export files from a previous attempt are deleted before
    /// the worker starts, so postcondition file checks reflect only this
    /// attempt's side effects.
    pub async fn execute(&self, candidate: &CandidateProgram) -> SandboxResult<WorkerReport> {
        self.clear_stale_exports()?;
        self.invoke("run", candidate).await
    }

    /// Delete any expected export files left behind by a previous attempt.
    pub fn clear_stale_exports(&self) -> SandboxResult<()> {
        for name in EXPECTED_EXPORT_FILES {
            let path = self.config.workdir.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(file = %path.display(), "removed stale export"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    async fn invoke(
        &self,
        mode: &'static str,
        candidate: &CandidateProgram,
    ) -> SandboxResult<WorkerReport> {
        std::fs::create_dir_all(&self.config.workdir)?;

        let scratch = tempfile::tempdir()?;
        let driver_path = scratch.path().join("sandbox_runner.py");
        let candidate_path = scratch.path().join("candidate.py");
        let report_path = scratch.path().join("report.json");
        std::fs::write(&driver_path, DRIVER_SOURCE)?;
        std::fs::write(&candidate_path, candidate.source())?;

        let child = Command::new(&self.config.python_bin)
            .arg(&driver_path)
            .arg(mode)
            .arg(&candidate_path)
            .arg(&report_path)
            .current_dir(&self.config.workdir)
            .env("CADFORGE_CAD_MODULE", &self.config.cad_module)
            .env("CADFORGE_CAD_ALIAS", &self.config.cad_alias)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let limit = Duration::from_secs(self.config.timeout_secs);
        let output = match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                // Dropping the in-flight future killed the worker.
                return Err(SandboxError::Timeout {
                    limit_secs: self.config.timeout_secs,
                });
            }
        };

        let raw = match std::fs::read_to_string(&report_path) {
            Ok(raw) => raw,
            Err(_) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(SandboxError::Environment {
                    message: format!(
                        "worker exited with {} before reporting: {}",
                        output.status,
                        stderr.trim()
                    ),
                });
            }
            Err(_) => return Err(SandboxError::MissingReport),
        };

        let report: WorkerReport = serde_json::from_str(raw.trim())?;
        debug!(
            mode,
            candidate = %candidate.short_digest(),
            report = report.tag(),
            "sandbox worker finished"
        );

        match report {
            WorkerReport::DriverError { message } => Err(SandboxError::Environment { message }),
            report => Ok(report),
        }
    }
}
