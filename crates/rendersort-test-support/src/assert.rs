//! Assertions over materialised directory trees.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use walkdir::WalkDir;

/// Sorted `/`-separated relative paths of every file under `root`.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked.
pub fn list_tree(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.context("failed to walk tree")?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root)?;
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.push(name);
    }
    files.sort();
    Ok(files)
}

/// Fail unless the files under `root` are exactly `expected` (order-insensitive).
///
/// # Errors
///
/// Returns an error describing both listings when they differ.
pub fn assert_tree<S: AsRef<str>>(root: &Path, expected: &[S]) -> Result<()> {
    let actual = list_tree(root)?;
    let mut expected: Vec<String> = expected.iter().map(|path| path.as_ref().to_string()).collect();
    expected.sort();
    ensure!(
        actual == expected,
        "tree mismatch under {}: expected {expected:?}, found {actual:?}",
        root.display()
    );
    Ok(())
}
