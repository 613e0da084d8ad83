//! Working directory access
//!
//! Enumerates one directory level at a time and reads file contents. The
//! repository turns these into blobs and trees; nothing here touches the
//! object store.

use crate::model::FileMode;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the repository metadata directory inside a workspace
pub const META_DIR: &str = ".cairn";

const IGNORED: &[&str] = &[META_DIR, ".git", ".DS_Store", "Thumbs.db"];

/// A directory tree whose files can be snapshotted
#[derive(Clone, Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Workspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Children of `dir`, sorted by path, with metadata and housekeeping
    /// entries skipped
    ///
    /// Symbolic links are not followed or recorded.
    pub fn list_entries(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if IGNORED.iter().any(|ignored| name == *ignored) {
                continue;
            }
            if entry.file_type()?.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
                continue;
            }
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }

    pub fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    /// Mode a path should be recorded with
    pub fn file_mode(&self, path: &Path) -> Result<FileMode> {
        let metadata = fs::symlink_metadata(path)?;
        if metadata.is_dir() {
            return Ok(FileMode::Directory);
        }
        Ok(if is_executable(&metadata) {
            FileMode::Executable
        } else {
            FileMode::Regular
        })
    }

    /// Basename of `path` as a tree entry name
    pub fn entry_name(&self, path: &Path) -> Result<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Encoding(format!(
                    "file name of {} is not valid UTF-8",
                    path.display()
                ))
            })
    }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
