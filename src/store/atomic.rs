//! Write-then-rename file replacement
//!
//! Data goes to a randomly named temp file created with `O_EXCL` in the
//! destination directory, is fsynced, then renamed over the final path. A
//! reader of the final path sees either nothing, the old file, or the
//! complete new one.

use crate::error::StoreError;
use crate::Result;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Attempts at finding an unused temp file name before giving up
pub const TEMP_FILE_ATTEMPTS: u32 = 8;

const TEMP_PREFIX: &str = "tmp_obj_";

/// Atomically place `data` at `path`, creating the parent directory if needed
pub(crate) fn write_atomic(path: &Path, data: &[u8], read_only: bool) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| StoreError::DirectoryCreateFailed {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut file = create_temp(dir)?;
    let temp_path = file.path().to_path_buf();
    let written = file
        .write_all(data)
        .and_then(|_| file.as_file().sync_all())
        .and_then(|_| {
            if read_only {
                set_read_only(file.as_file())
            } else {
                Ok(())
            }
        });
    if let Err(source) = written {
        return Err(StoreError::WriteFailed {
            path: temp_path,
            source,
        }
        .into());
    }

    // On failure the returned file handle drops here, removing the temp file.
    file.persist(path)
        .map_err(|e| StoreError::RenameFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;
    Ok(())
}

fn create_temp(dir: &Path) -> Result<NamedTempFile> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .rand_bytes(12)
            .tempfile_in(dir)
        {
            Ok(file) => return Ok(file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < TEMP_FILE_ATTEMPTS => {
                debug!(attempt, dir = %dir.display(), "temp file name collision, retrying");
            }
            Err(source) => {
                return Err(StoreError::TempFileFailed {
                    dir: dir.to_path_buf(),
                    attempts: attempt,
                    source,
                }
                .into())
            }
        }
    }
}

/// Whether a directory entry is a leftover temp file from an interrupted write
pub fn is_temp_file(name: &str) -> bool {
    name.starts_with(TEMP_PREFIX)
}

#[cfg(unix)]
fn set_read_only(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o444))
}

#[cfg(not(unix))]
fn set_read_only(file: &fs::File) -> std::io::Result<()> {
    let mut perms = file.metadata()?.permissions();
    perms.set_readonly(true);
    file.set_permissions(perms)
}
