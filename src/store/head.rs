//! Single head pointer
//!
//! HEAD is a one-line file holding the hex id of the latest commit. It is
//! replaced with the same temp-file-and-rename protocol as objects, so a
//! reader never sees a half-written id.

use super::atomic::write_atomic;
use crate::model::ObjectId;
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// The persisted reference to the current commit
#[derive(Clone, Debug)]
pub struct Head {
    path: PathBuf,
}

impl Head {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Head { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current commit id, or `None` before the first commit
    pub fn read(&self) -> Result<Option<ObjectId>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        ObjectId::from_hex(trimmed)
            .map(Some)
            .map_err(|e| Error::Corruption(format!("HEAD: {}", e)))
    }

    /// Point HEAD at a commit
    pub fn update(&self, commit: &ObjectId) -> Result<()> {
        write_atomic(&self.path, format!("{}\n", commit).as_bytes(), false)?;
        info!(%commit, "updated HEAD");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_head_is_none() {
        let dir = tempdir().unwrap();
        let head = Head::new(dir.path().join("HEAD"));
        assert_eq!(head.read().unwrap(), None);
    }

    #[test]
    fn test_update_and_read() {
        let dir = tempdir().unwrap();
        let head = Head::new(dir.path().join("HEAD"));

        let first = ObjectId::digest(b"first");
        let second = ObjectId::digest(b"second");

        head.update(&first).unwrap();
        assert_eq!(head.read().unwrap(), Some(first));

        head.update(&second).unwrap();
        assert_eq!(head.read().unwrap(), Some(second));
        assert_eq!(
            fs::read_to_string(head.path()).unwrap(),
            format!("{}\n", second)
        );
    }

    #[test]
    fn test_garbage_head_is_corruption() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("HEAD");
        fs::write(&path, "ref: refs/heads/main\n").unwrap();

        assert!(matches!(Head::new(path).read(), Err(Error::Corruption(_))));
    }
}
