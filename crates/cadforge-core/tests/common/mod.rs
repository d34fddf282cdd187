//! Shared fixtures for sandbox/pipeline integration tests.
//!
//! Tests that spawn a real interpreter are gated on [`python_missing`] and
//! run candidates against a stub CAD module written into the scratch
//! working directory, so no CAD kernel needs to be installed.

#![allow(dead_code)]

use std::path::Path;

use cadforge_core::{python_available, SandboxConfig};

/// Minimal stand-in for the CAD library: solids with a `val()` structural
/// check and an `export()` that writes a file.
pub const STUB_CAD_MODULE: &str = r#"
class Solid:
    def __init__(self, valid=True):
        self._valid = valid

    def val(self):
        if not self._valid:
            raise ValueError("degenerate geometry")
        return self


def make_cube(size=10):
    return Solid()


def make_broken():
    return Solid(valid=False)


def export(model, path):
    with open(path, "w") as fp:
        fp.write("solid cadforge\n")
"#;

/// Sandbox config pointed at the stub module inside `workdir`.
pub fn stub_sandbox(workdir: &Path) -> SandboxConfig {
    std::fs::write(workdir.join("fakecad.py"), STUB_CAD_MODULE).expect("write stub CAD module");
    SandboxConfig::in_workdir(workdir)
        .with_cad_module("fakecad", "cq")
        .with_timeout_secs(30)
}

/// True (with a note on stderr) when no interpreter is available to spawn.
pub fn python_missing() -> bool {
    let available = python_available(Path::new("python3"));
    if !available {
        eprintln!("skipping: python3 not available on this host");
    }
    !available
}
