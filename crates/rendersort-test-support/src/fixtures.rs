//! Sample render filenames and temporary directory helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Group identifier used by the sample renders.
pub const SAMPLE_GROUP: &str = "G8R25CLAJRAYP611D12-TZRGL00009";

/// Render filename for `pass` of the sample group at version 1.
#[must_use]
pub fn pass_name(pass: u32, frame: u32) -> String {
    render_name(SAMPLE_GROUP, "Y", 1, pass, frame)
}

/// Render filename built from every field.
#[must_use]
pub fn render_name(group: &str, metal: &str, version: u32, pass: u32, frame: u32) -> String {
    format!("{group}-{metal}-V{version}_Output AOV {pass}_{frame:04}.png")
}

/// Expected normalized path for the sample group, relative to its anchor.
#[must_use]
pub fn expected_output(code: &str, lighting: &str) -> String {
    format!("{SAMPLE_GROUP}/{SAMPLE_GROUP}-{code}-V1-{lighting}.png")
}

/// A mixed batch: two mapped passes, one collision, one unparsable PNG and one non-PNG file.
#[must_use]
pub fn sample_batch() -> Vec<(String, Vec<u8>)> {
    vec![
        (pass_name(3, 70), b"pass-3".to_vec()),
        (pass_name(10, 70), b"pass-10".to_vec()),
        (pass_name(3, 71), b"pass-3-again".to_vec()),
        ("randomfile.png".to_string(), b"random".to_vec()),
        ("notes.txt".to_string(), b"notes".to_vec()),
    ]
}

/// Fresh temporary directory whose name starts with `prefix`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_dir(prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .context("failed to create temp dir")
}

/// Write `files` (relative name, content) under `root`, creating parent directories.
///
/// # Errors
///
/// Returns an error if any directory or file cannot be written.
pub fn write_tree<N: AsRef<str>>(root: &Path, files: &[(N, Vec<u8>)]) -> Result<()> {
    for (name, bytes) in files {
        let path = root.join(name.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
