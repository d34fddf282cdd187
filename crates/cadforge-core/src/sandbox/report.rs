//! Wire-protocol types written by the sandbox driver.
//!
//! The driver serializes exactly one JSON object per invocation into a
//! scratch report file. Transporting the report through a file rather than
//! stdout keeps the protocol immune to anything the candidate prints.

use serde::{Deserialize, Serialize};

/// Fault raised while invoking the artifact's structural validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityFault {
    pub category: String,
    pub message: String,
}

/// What the driver observed about the required result binding after the
/// candidate ran to completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindingReport {
    /// The binding exists and is non-null.
    pub present: bool,

    /// Reported type name of the binding, when present.
    pub type_name: Option<String>,

    /// The binding exposes the structural-validation operation.
    pub has_capability: bool,

    /// Fault raised by invoking that operation, if any.
    pub capability_error: Option<CapabilityFault>,
}

/// One report from a driver invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkerReport {
    /// Check mode: candidate parsed; advisory warnings attached.
    Parsed { warnings: Vec<String> },

    /// Check mode: candidate failed to parse.
    SyntaxError {
        message: String,
        line: Option<u32>,
    },

    /// Run mode: candidate executed without an uncaught fault.
    Completed {
        warnings: Vec<String>,
        binding: BindingReport,
    },

    /// Run mode: an uncaught fault escaped the candidate.
    Fault {
        category: String,
        message: String,
        line: Option<u32>,
        source_line: Option<String>,
        warnings: Vec<String>,
    },

    /// The driver itself could not do its job (e.g. CAD module missing).
    DriverError { message: String },
}

impl WorkerReport {
    /// Short tag for protocol-error messages.
    pub fn tag(&self) -> &'static str {
        match self {
            WorkerReport::Parsed { .. } => "parsed",
            WorkerReport::SyntaxError { .. } => "syntax_error",
            WorkerReport::Completed { .. } => "completed",
            WorkerReport::Fault { .. } => "fault",
            WorkerReport::DriverError { .. } => "driver_error",
        }
    }
}
