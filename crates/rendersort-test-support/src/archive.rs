//! In-memory zip helpers.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use anyhow::{Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Build a zip archive holding `entries`. Names ending in `/` become directory entries.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
pub fn zip_bytes<N: AsRef<str>>(entries: &[(N, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        let name = name.as_ref();
        if name.ends_with('/') {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            writer.write_all(bytes)?;
        }
    }
    Ok(writer.finish()?.into_inner())
}

/// Decode an archive into a sorted map of file name to content, skipping directory entries.
///
/// # Errors
///
/// Returns an error if `bytes` is not a readable zip archive.
pub fn read_zip(bytes: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).context("invalid zip archive")?;
    let mut files = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        files.insert(entry.name().to_string(), content);
    }
    Ok(files)
}

/// Sorted file names contained in an archive.
///
/// # Errors
///
/// Returns an error if `bytes` is not a readable zip archive.
pub fn zip_entry_names(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(read_zip(bytes)?.into_keys().collect())
}
