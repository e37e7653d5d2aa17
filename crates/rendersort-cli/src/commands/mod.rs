//! Command handlers, one module per subcommand.

pub(crate) mod map;
pub(crate) mod run;
pub(crate) mod upload;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::anyhow;
use tracing::debug;

use crate::client::{CliError, CliResult};

/// Write an archive to `path`, refusing to replace an existing file.
pub(crate) fn write_archive(path: &Path, bytes: &[u8]) -> CliResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| {
            if err.kind() == io::ErrorKind::AlreadyExists {
                CliError::validation(format!("archive already exists: {}", path.display()))
            } else {
                CliError::failure(anyhow!("failed to create {}: {err}", path.display()))
            }
        })?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write {}: {err}", path.display())))?;
    debug!(path = %path.display(), bytes = bytes.len(), "archive written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn archive_is_written_once() -> Result<()> {
        let dir = rendersort_test_support::fixtures::temp_dir("rendersort-cli-")?;
        let path = dir.path().join("out.zip");
        write_archive(&path, b"first")?;
        assert_eq!(std::fs::read(&path)?, b"first");

        let Err(err) = write_archive(&path, b"second") else {
            anyhow::bail!("second write should be refused");
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(std::fs::read(&path)?, b"first");
        Ok(())
    }
}
