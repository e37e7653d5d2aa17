//! Input providers: local directories and uploaded zip archives.
//!
//! # Design
//! - Scanning lists names up front and sorts them lexicographically; content is read lazily.
//! - Archive entry names are sanitised before they can reach a filesystem path.

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use rendersort_core::RawItem;
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{FsOpsError, FsOpsResult};
use crate::paths::sanitize_relative_path;

/// Files under a local directory, in lexicographic order of their relative names.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl DirectorySource {
    /// Walk `root` and record every regular file beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory or cannot be traversed.
    pub fn scan(root: &Path) -> FsOpsResult<Self> {
        let metadata =
            fs::metadata(root).map_err(|source| FsOpsError::io("source.stat_root", root, source))?;
        if !metadata.is_dir() {
            return Err(FsOpsError::invalid(
                "source_root",
                "not_a_directory",
                root.to_string_lossy(),
            ));
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|source| FsOpsError::walkdir("source.walk", root, source))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| FsOpsError::InvalidInput {
                    field: "source_path",
                    reason: "strip_prefix",
                    value: Some(entry.path().to_string_lossy().into_owned()),
                })?;
            let name = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.insert(name, entry.path().to_path_buf());
        }
        debug!(root = %root.display(), files = files.len(), "directory scanned");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    /// Directory the source was scanned from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the directory held no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Relative names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Read each file in order; a read failure is yielded in place of the item.
    pub fn into_items(self) -> impl Iterator<Item = FsOpsResult<RawItem>> {
        self.files.into_iter().map(|(name, path)| {
            fs::read(&path)
                .map(|bytes| RawItem::new(name, bytes))
                .map_err(|source| FsOpsError::io("source.read_file", path, source))
        })
    }
}

/// Files inside an uploaded zip archive, in lexicographic order of their entry names.
pub struct ZipSource {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: BTreeMap<String, usize>,
}

impl std::fmt::Debug for ZipSource {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ZipSource")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl ZipSource {
    /// Decode the archive directory and validate every entry name.
    ///
    /// # Errors
    ///
    /// Returns an error for undecodable archives, entry names that escape the
    /// archive root, and duplicate entry names.
    pub fn new(bytes: Vec<u8>) -> FsOpsResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|source| FsOpsError::zip("source.decode_zip", "archive", source))?;

        let mut entries = BTreeMap::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|source| FsOpsError::zip("source.read_entry", "archive", source))?;
            if entry.is_dir() {
                continue;
            }
            let name = sanitize_relative_path("archive_entry", entry.name())?;
            if entries.insert(name, index).is_some() {
                return Err(FsOpsError::invalid(
                    "archive_entry",
                    "duplicate_entry",
                    entry.name(),
                ));
            }
        }
        debug!(entries = entries.len(), "zip archive decoded");

        Ok(Self { archive, entries })
    }

    /// Number of file entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive held no file entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sanitised entry names in processing order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Decompress each entry in order; a decode failure is yielded in place of the item.
    pub fn into_items(self) -> impl Iterator<Item = FsOpsResult<RawItem>> {
        let Self {
            mut archive,
            entries,
        } = self;
        entries.into_iter().map(move |(name, index)| {
            let mut entry = archive
                .by_index(index)
                .map_err(|source| FsOpsError::zip("source.open_entry", name.as_str(), source))?;
            let capacity = usize::try_from(entry.size()).unwrap_or_default();
            let mut bytes = Vec::with_capacity(capacity);
            entry
                .read_to_end(&mut bytes)
                .map_err(|source| FsOpsError::io("source.inflate_entry", name.as_str(), source))?;
            drop(entry);
            Ok(RawItem::new(name, bytes))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use rendersort_test_support::archive::zip_bytes;
    use rendersort_test_support::fixtures::{temp_dir, write_tree};

    #[test]
    fn directory_items_are_sorted_by_full_relative_name() -> Result<()> {
        let dir = temp_dir("rendersort-source-")?;
        write_tree(
            dir.path(),
            &[
                ("b.png", b"b".to_vec()),
                ("a/z.png", b"az".to_vec()),
                ("a-b.png", b"ab".to_vec()),
                ("a/c/d.txt", b"d".to_vec()),
            ],
        )?;

        let source = DirectorySource::scan(dir.path())?;
        assert_eq!(source.len(), 4);
        let names: Vec<String> = source.names().map(str::to_string).collect();
        assert_eq!(names, ["a-b.png", "a/c/d.txt", "a/z.png", "b.png"]);

        let items = source.into_items().collect::<FsOpsResult<Vec<_>>>()?;
        assert_eq!(items[2].name(), "a/z.png");
        assert_eq!(items[2].bytes(), b"az");
        Ok(())
    }

    #[test]
    fn directory_scan_rejects_files() -> Result<()> {
        let dir = temp_dir("rendersort-source-")?;
        write_tree(dir.path(), &[("file.png", Vec::new())])?;
        let result = DirectorySource::scan(&dir.path().join("file.png"));
        assert!(matches!(
            result,
            Err(FsOpsError::InvalidInput {
                reason: "not_a_directory",
                ..
            })
        ));
        assert!(DirectorySource::scan(&dir.path().join("missing")).is_err());
        Ok(())
    }

    #[test]
    fn directory_read_failures_surface_as_items() -> Result<()> {
        let dir = temp_dir("rendersort-source-")?;
        write_tree(dir.path(), &[("gone.png", b"x".to_vec())])?;
        let source = DirectorySource::scan(dir.path())?;
        fs::remove_file(dir.path().join("gone.png"))?;
        let mut items = source.into_items();
        assert!(matches!(items.next(), Some(Err(FsOpsError::Io { .. }))));
        Ok(())
    }

    #[test]
    fn zip_entries_are_sorted_and_directories_skipped() -> Result<()> {
        let bytes = zip_bytes(&[
            ("shots/", Vec::new()),
            ("shots/b.png", b"b".to_vec()),
            ("a.png", b"a".to_vec()),
            ("./c.txt", b"c".to_vec()),
        ])?;
        let source = ZipSource::new(bytes)?;
        let names: Vec<String> = source.names().map(str::to_string).collect();
        assert_eq!(names, ["a.png", "c.txt", "shots/b.png"]);

        let items = source.into_items().collect::<FsOpsResult<Vec<_>>>()?;
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].file_name(), "b.png");
        assert_eq!(items[2].bytes(), b"b");
        Ok(())
    }

    #[test]
    fn zip_entries_escaping_the_root_are_rejected() -> Result<()> {
        for name in ["../evil.png", "/etc/evil.png", "a/../../evil.png"] {
            let bytes = zip_bytes(&[(name, b"x".to_vec())])?;
            assert!(
                matches!(ZipSource::new(bytes), Err(FsOpsError::InvalidInput { .. })),
                "{name} should be rejected"
            );
        }
        Ok(())
    }

    #[test]
    fn zip_duplicate_entries_are_rejected() -> Result<()> {
        let bytes = zip_bytes(&[("a.png", b"1".to_vec()), ("./a.png", b"2".to_vec())])?;
        assert!(matches!(
            ZipSource::new(bytes),
            Err(FsOpsError::InvalidInput {
                reason: "duplicate_entry",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn garbage_is_not_an_archive() {
        assert!(matches!(
            ZipSource::new(b"not a zip".to_vec()),
            Err(FsOpsError::Zip { .. })
        ));
    }
}
