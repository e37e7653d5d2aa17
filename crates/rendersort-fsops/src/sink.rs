//! Output consumers: directories on disk and zip archives in memory.
//!
//! # Design
//! - Nothing here overwrites an existing file; collisions surface as [`FsOpsError::DestinationExists`].
//! - Clean output only ever writes into an empty or missing root.

use std::fs::{self, OpenOptions};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use rendersort_core::{OutputItem, TreeEntry};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{FsOpsError, FsOpsResult};
use crate::paths::{join_relative, sanitize_relative_path};

/// File name used for packaged results.
pub const ARCHIVE_FILE_NAME: &str = "processed.zip";

/// Writes reorganization results below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Sink rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the sink.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every output into a fresh root, returning the number of files written.
    ///
    /// # Errors
    ///
    /// Returns an error if the root already holds entries, a path is unsafe, or a write fails.
    pub fn write_clean(&self, outputs: &[OutputItem]) -> FsOpsResult<usize> {
        self.ensure_empty_root()?;
        for output in outputs {
            let target = self.target_path(&output.relative_path)?;
            create_parent(&target)?;
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .map_err(|source| match source.kind() {
                    std::io::ErrorKind::AlreadyExists => FsOpsError::DestinationExists {
                        path: target.clone(),
                    },
                    _ => FsOpsError::io("sink.create_file", &target, source),
                })?;
            file.write_all(&output.bytes)
                .map_err(|source| FsOpsError::io("sink.write_file", &target, source))?;
            debug!(path = %target.display(), "output written");
        }
        info!(root = %self.root.display(), files = outputs.len(), "clean output written");
        Ok(outputs.len())
    }

    /// Move each output's source file to its new path inside the root.
    ///
    /// Files that were not renamed stay where they are.
    ///
    /// # Errors
    ///
    /// Returns an error if a destination already exists, a path is unsafe, or a rename fails.
    pub fn apply_in_place(&self, outputs: &[OutputItem]) -> FsOpsResult<usize> {
        for output in outputs {
            let from = self.target_path(&output.source_name)?;
            let to = self.target_path(&output.relative_path)?;
            if to.exists() {
                return Err(FsOpsError::DestinationExists { path: to });
            }
            create_parent(&to)?;
            fs::rename(&from, &to).map_err(|source| FsOpsError::io("sink.rename", &from, source))?;
            debug!(from = %from.display(), to = %to.display(), "file renamed in place");
        }
        info!(root = %self.root.display(), files = outputs.len(), "in-place renames applied");
        Ok(outputs.len())
    }

    fn ensure_empty_root(&self) -> FsOpsResult<()> {
        match fs::read_dir(&self.root) {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    return Err(FsOpsError::invalid(
                        "destination",
                        "not_empty",
                        self.root.to_string_lossy(),
                    ));
                }
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => fs::create_dir_all(&self.root)
                .map_err(|source| FsOpsError::io("sink.create_root", &self.root, source)),
            Err(source) => Err(FsOpsError::io("sink.read_root", &self.root, source)),
        }
    }

    fn target_path(&self, relative: &str) -> FsOpsResult<PathBuf> {
        let relative = sanitize_relative_path("output_path", relative)?;
        Ok(join_relative(&self.root, &relative))
    }
}

fn create_parent(path: &Path) -> FsOpsResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| match source.kind() {
            // A kept file already occupies a directory component of the destination.
            std::io::ErrorKind::AlreadyExists | std::io::ErrorKind::NotADirectory => {
                FsOpsError::invalid("destination", "conflicting_path", parent.to_string_lossy())
            }
            _ => FsOpsError::io("sink.create_parent", parent, source),
        })?;
    }
    Ok(())
}

/// Packages a result tree into a deflated zip archive.
#[derive(Debug, Clone, Copy)]
pub struct ZipSink {
    compression: CompressionMethod,
}

impl Default for ZipSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipSink {
    /// Sink producing deflate-compressed entries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            compression: CompressionMethod::Deflated,
        }
    }

    /// Archive `tree` in memory, entries in the order given.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is unsafe or the archive cannot be written.
    pub fn package(&self, tree: &[TreeEntry]) -> FsOpsResult<Vec<u8>> {
        let options = FileOptions::default().compression_method(self.compression);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for entry in tree {
            let name = sanitize_relative_path("archive_entry", &entry.path)?;
            writer
                .start_file(name.as_str(), options)
                .map_err(|source| FsOpsError::zip("sink.start_entry", name.as_str(), source))?;
            writer
                .write_all(&entry.bytes)
                .map_err(|source| FsOpsError::io("sink.write_entry", name.as_str(), source))?;
        }
        let cursor = writer
            .finish()
            .map_err(|source| FsOpsError::zip("sink.finish_archive", ARCHIVE_FILE_NAME, source))?;
        let bytes = cursor.into_inner();
        debug!(entries = tree.len(), bytes = bytes.len(), "archive packaged");
        Ok(bytes)
    }

    /// Archive `tree` and write it to `path`, refusing to replace an existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if packaging fails or `path` exists or cannot be written.
    pub fn write_to(&self, tree: &[TreeEntry], path: &Path) -> FsOpsResult<usize> {
        let bytes = self.package(tree)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::AlreadyExists => FsOpsError::DestinationExists {
                    path: path.to_path_buf(),
                },
                _ => FsOpsError::io("sink.create_archive", path, source),
            })?;
        file.write_all(&bytes)
            .map_err(|source| FsOpsError::io("sink.write_archive", path, source))?;
        Ok(bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rendersort_test_support::archive::read_zip;
    use rendersort_test_support::assert::assert_tree;
    use rendersort_test_support::fixtures::{temp_dir, write_tree};

    fn output(source: &str, target: &str, bytes: &[u8]) -> OutputItem {
        OutputItem {
            relative_path: target.to_string(),
            source_name: source.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn clean_output_creates_missing_root() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        let sink = DirectorySink::new(dir.path().join("out"));
        let written = sink.write_clean(&[output("x.png", "G-1/G-1-14Y-V1-WB.png", b"x")])?;
        assert_eq!(written, 1);
        assert_tree(sink.root(), &["G-1/G-1-14Y-V1-WB.png"])?;
        assert_eq!(fs::read(sink.root().join("G-1/G-1-14Y-V1-WB.png"))?, b"x");
        Ok(())
    }

    #[test]
    fn clean_output_refuses_non_empty_root() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        write_tree(dir.path(), &[("existing.txt", b"keep".to_vec())])?;
        let sink = DirectorySink::new(dir.path());
        let result = sink.write_clean(&[output("x.png", "G-1/y.png", b"x")]);
        assert!(matches!(
            result,
            Err(FsOpsError::InvalidInput {
                reason: "not_empty",
                ..
            })
        ));
        assert_tree(dir.path(), &["existing.txt"])?;
        Ok(())
    }

    #[test]
    fn in_place_moves_sources_and_keeps_the_rest() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        write_tree(
            dir.path(),
            &[("shots/a.png", b"a".to_vec()), ("shots/keep.png", b"k".to_vec())],
        )?;
        let sink = DirectorySink::new(dir.path());
        sink.apply_in_place(&[output("shots/a.png", "shots/G-1/G-1-CPG-V1-WB.png", b"a")])?;
        assert_tree(dir.path(), &["shots/G-1/G-1-CPG-V1-WB.png", "shots/keep.png"])?;
        Ok(())
    }

    #[test]
    fn in_place_never_overwrites() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        write_tree(
            dir.path(),
            &[("a.png", b"new".to_vec()), ("G-1/taken.png", b"old".to_vec())],
        )?;
        let sink = DirectorySink::new(dir.path());
        let result = sink.apply_in_place(&[output("a.png", "G-1/taken.png", b"new")]);
        assert!(matches!(result, Err(FsOpsError::DestinationExists { .. })));
        assert_eq!(fs::read(dir.path().join("G-1/taken.png"))?, b"old");
        assert_eq!(fs::read(dir.path().join("a.png"))?, b"new");
        Ok(())
    }

    #[test]
    fn in_place_reports_files_blocking_a_group_folder() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        write_tree(dir.path(), &[("a.png", b"a".to_vec()), ("G-1", b"notes".to_vec())])?;
        let sink = DirectorySink::new(dir.path());
        let err = sink
            .apply_in_place(&[output("a.png", "G-1/G-1-CPG-V1-WB.png", b"a")])
            .expect_err("a file named like the group folder must block the move");
        assert!(matches!(
            err,
            FsOpsError::InvalidInput {
                reason: "conflicting_path",
                ..
            }
        ));
        assert!(err.is_client_error());
        assert_eq!(fs::read(dir.path().join("G-1"))?, b"notes");
        assert_eq!(fs::read(dir.path().join("a.png"))?, b"a");
        Ok(())
    }

    #[test]
    fn sinks_reject_escaping_paths() -> Result<()> {
        let dir = temp_dir("rendersort-sink-")?;
        let sink = DirectorySink::new(dir.path().join("out"));
        assert!(sink.write_clean(&[output("a.png", "../a.png", b"")]).is_err());
        let tree = [TreeEntry {
            path: "/etc/a.png".to_string(),
            bytes: Vec::new(),
        }];
        assert!(ZipSink::new().package(&tree).is_err());
        Ok(())
    }

    #[test]
    fn zip_sink_packages_every_entry() -> Result<()> {
        let tree = vec![
            TreeEntry {
                path: "G-1/a.png".to_string(),
                bytes: b"a".to_vec(),
            },
            TreeEntry {
                path: "notes.txt".to_string(),
                bytes: b"n".to_vec(),
            },
        ];
        let bytes = ZipSink::new().package(&tree)?;
        let files = read_zip(&bytes)?;
        assert_eq!(files.len(), 2);
        assert_eq!(files.get("G-1/a.png").map(Vec::as_slice), Some(&b"a"[..]));

        let dir = temp_dir("rendersort-sink-")?;
        let path = dir.path().join(ARCHIVE_FILE_NAME);
        ZipSink::new().write_to(&tree, &path)?;
        assert!(matches!(
            ZipSink::new().write_to(&tree, &path),
            Err(FsOpsError::DestinationExists { .. })
        ));
        Ok(())
    }
}
