//! Export archiving: the downstream handoff after a successful run.
//!
//! Moves the fixed-name export files out of the sandbox working directory
//! into an output directory under a name derived from the design's object
//! name, freeing the working directory for the next run. Failures here are
//! host errors, never diagnostics — the candidate already passed validation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{CadForgeError, Result, EXPECTED_EXPORT_FILES};

/// Lowercased, filesystem-safe stem derived from an object name.
pub fn archive_stem(object_name: &str) -> String {
    let stem: String = object_name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_').to_string();
    if stem.is_empty() {
        "object".to_string()
    } else {
        stem
    }
}

/// Move both export files from `workdir` into `out_dir`, renamed after the
/// object. Returns the archived paths in the same order as the expected
/// export list.
pub fn archive_exports(workdir: &Path, out_dir: &Path, object_name: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let stem = archive_stem(object_name);

    let mut archived = Vec::with_capacity(EXPECTED_EXPORT_FILES.len());
    for name in EXPECTED_EXPORT_FILES {
        let src = workdir.join(name);
        if !src.is_file() {
            return Err(CadForgeError::Export(format!(
                "expected export {name} missing from {}",
                workdir.display()
            )));
        }
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("out");
        let dst = out_dir.join(format!("{stem}.{extension}"));

        // rename fails across filesystems; fall back to copy + remove.
        if std::fs::rename(&src, &dst).is_err() {
            std::fs::copy(&src, &dst)?;
            std::fs::remove_file(&src)?;
        }
        info!(src = %src.display(), dst = %dst.display(), "archived export");
        archived.push(dst);
    }
    Ok(archived)
}
