//! Relative path sanitising shared by archive decoding and upload staging.

use std::path::{Component, Path, PathBuf};

use crate::error::{FsOpsError, FsOpsResult};

/// Normalise an untrusted relative name to `/`-separated components.
///
/// Backslashes are treated as separators and `.` components are dropped.
///
/// # Errors
///
/// Returns [`FsOpsError::InvalidInput`] for empty names, absolute paths and
/// names containing `..` or platform prefixes.
pub fn sanitize_relative_path(field: &'static str, name: &str) -> FsOpsResult<String> {
    let normalised = name.replace('\\', "/");
    let path = Path::new(&normalised);
    if path.is_absolute() || normalised.starts_with('/') {
        return Err(FsOpsError::invalid(field, "absolute_path", name));
    }

    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| FsOpsError::invalid(field, "non_utf8_segment", name))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(FsOpsError::invalid(field, "invalid_segment", name));
            }
        }
    }

    if segments.is_empty() {
        return Err(FsOpsError::invalid(field, "empty_path", name));
    }
    Ok(segments.join("/"))
}

/// Join a sanitised `/`-separated name onto `root`.
pub(crate) fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .fold(root.to_path_buf(), |path, segment| path.join(segment))
}
