//! # cairn
//!
//! A write-once, content-addressed object store for file snapshots.
//!
//! Data is turned into immutable objects, each named by the BLAKE3 hash of
//! its canonical encoding and persisted zstd-compressed with an atomic
//! rename.
//!
//! ## Core Concepts
//!
//! - **Blobs**: raw file contents
//! - **Trees**: one directory level, entries sorted by name
//! - **Commits**: a root tree plus author, timestamp and message
//! - **HEAD**: a single pointer to the latest commit
//!
//! ## Example
//!
//! ```ignore
//! use cairn::{Blob, Encode, ObjectStore};
//!
//! let store = ObjectStore::new(".cairn/objects");
//! let id = store.store(&Blob::new("hello"))?;
//! assert_eq!(store.read_raw(&id)?, b"blob 5\0hello");
//! ```

pub mod codec;
pub mod config;
pub mod model;
pub mod store;
pub mod workspace;

mod error;
mod repository;

pub use codec::{Encode, Object, ObjectKind};
pub use config::Config;
pub use error::{Error, Result, StoreError};
pub use model::{Author, Blob, Commit, Entry, FileMode, ObjectId, Tree};
pub use repository::{CommitSummary, Repository};
pub use store::{Head, ObjectStore};
pub use workspace::Workspace;
