//! Per-run scratch directories.
//!
//! # Design
//! - Each run owns a private directory under a configured root; it is removed when dropped.
//! - Uploaded names are sanitised before they touch the filesystem.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{FsOpsError, FsOpsResult};
use crate::paths::{join_relative, sanitize_relative_path};

const SCRATCH_PREFIX: &str = "rendersort-";
const INPUT_DIR: &str = "input";
const OUTPUT_DIR: &str = "output";

/// Isolated temporary directory holding one run's staged inputs and outputs.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a scratch directory under `root`, creating `root` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if either directory cannot be created.
    pub fn create_in(root: &Path) -> FsOpsResult<Self> {
        fs::create_dir_all(root)
            .map_err(|source| FsOpsError::io("scratch.create_root", root, source))?;
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(root)
            .map_err(|source| FsOpsError::io("scratch.create_dir", root, source))?;
        fs::create_dir(dir.path().join(INPUT_DIR))
            .map_err(|source| FsOpsError::io("scratch.create_input", dir.path(), source))?;
        debug!(path = %dir.path().display(), "scratch space created");
        Ok(Self { dir })
    }

    /// Scratch directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding staged inputs.
    #[must_use]
    pub fn input_dir(&self) -> PathBuf {
        self.dir.path().join(INPUT_DIR)
    }

    /// Directory for clean output; not created until something is written into it.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_DIR)
    }

    /// Stage one uploaded file under the input directory.
    ///
    /// # Errors
    ///
    /// Returns an error for unsafe or repeated names and for write failures.
    pub fn stage_input(&self, name: &str, bytes: &[u8]) -> FsOpsResult<PathBuf> {
        let relative = sanitize_relative_path("upload_name", name)?;
        let target = join_relative(&self.input_dir(), &relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| FsOpsError::io("scratch.create_parent", parent, source))?;
        }
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    FsOpsError::invalid("upload_name", "duplicate_name", name)
                }
                // A file staged earlier occupies a directory component of this name.
                std::io::ErrorKind::NotADirectory => {
                    FsOpsError::invalid("upload_name", "conflicting_path", name)
                }
                _ => FsOpsError::io("scratch.write_input", &target, source),
            })?;
        file.write_all(bytes)
            .map_err(|source| FsOpsError::io("scratch.write_input", &target, source))?;
        Ok(target)
    }
}
