//! Sharded, write-once object directory
//!
//! Layout:
//! ```text
//! <root>/
//!   <first 2 hex chars of id>/
//!     <remaining 62 hex chars>    zstd-compressed canonical bytes
//! ```
//!
//! The store holds no in-process locks. Concurrent writers of the same
//! content race to rename byte-identical files onto the same path, so
//! whichever wins, the result is the same object.

use super::atomic::write_atomic;
use super::compress::{self, DEFAULT_LEVEL};
use crate::codec::{Encode, Object, ObjectKind};
use crate::error::StoreError;
use crate::model::{Blob, Commit, ObjectId, Tree};
use crate::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A content-addressed object store rooted at one directory
#[derive(Clone, Debug)]
pub struct ObjectStore {
    root: PathBuf,
    level: i32,
}

impl ObjectStore {
    /// Create a handle for the store at `root`
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ObjectStore {
            root: root.into(),
            level: DEFAULT_LEVEL,
        }
    }

    /// Use a different zstd level for new objects
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn compression_level(&self) -> i32 {
        self.level
    }

    /// Where the object with this id lives (or would live)
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let (dir, file) = id.shard();
        self.root.join(dir).join(file)
    }

    /// Check whether an object file exists
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Encode, address and persist an object, returning its id
    pub fn store<T: Encode + ?Sized>(&self, object: &T) -> Result<ObjectId> {
        let bytes = object.encode()?;
        self.write_canonical(&bytes)
    }

    /// Persist bytes that are already in canonical form
    #[instrument(skip(self, canonical), fields(len = canonical.len()), level = "debug")]
    pub fn write_canonical(&self, canonical: &[u8]) -> Result<ObjectId> {
        let id = ObjectId::digest(canonical);
        let path = self.object_path(&id);

        if path.is_file() {
            debug!(%id, "object already stored, skipping write");
            return Ok(id);
        }

        let compressed = compress::compress(canonical, self.level)?;
        match write_atomic(&path, &compressed, true) {
            Ok(()) => {
                debug!(%id, compressed = compressed.len(), "stored object");
                Ok(id)
            }
            // Another writer landed the same content first.
            Err(Error::Store(StoreError::RenameFailed { .. })) if path.is_file() => {
                debug!(%id, "lost rename race to identical object");
                Ok(id)
            }
            Err(e) => Err(e),
        }
    }

    /// Read an object's canonical bytes, verifying them against the id
    pub fn read_raw(&self, id: &ObjectId) -> Result<Vec<u8>> {
        let path = self.object_path(id);
        let compressed = fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(id.to_hex()),
            _ => Error::Io(e),
        })?;

        let canonical = compress::decompress(&compressed)?;
        let actual = ObjectId::digest(&canonical);
        if actual != *id {
            return Err(Error::Corruption(format!(
                "object {} hashes to {}",
                id, actual
            )));
        }
        Ok(canonical)
    }

    /// Read and decode an object
    pub fn load(&self, id: &ObjectId) -> Result<Object> {
        Object::decode(&self.read_raw(id)?)
    }

    pub fn load_blob(&self, id: &ObjectId) -> Result<Blob> {
        match self.load(id)? {
            Object::Blob(blob) => Ok(blob),
            other => Err(mismatch(id, ObjectKind::Blob, &other)),
        }
    }

    pub fn load_tree(&self, id: &ObjectId) -> Result<Tree> {
        match self.load(id)? {
            Object::Tree(tree) => Ok(tree),
            other => Err(mismatch(id, ObjectKind::Tree, &other)),
        }
    }

    pub fn load_commit(&self, id: &ObjectId) -> Result<Commit> {
        match self.load(id)? {
            Object::Commit(commit) => Ok(commit),
            other => Err(mismatch(id, ObjectKind::Commit, &other)),
        }
    }
}

fn mismatch(id: &ObjectId, expected: ObjectKind, found: &Object) -> Error {
    Error::Corruption(format!(
        "expected {} for {}, got {}",
        expected,
        id,
        found.kind()
    ))
}
