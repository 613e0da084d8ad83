//! Core data model types for cairn

mod blob;
mod commit;
mod id;
mod tree;

pub use blob::Blob;
pub use commit::{Author, Commit};
pub use id::{ObjectId, HEX_LEN, ID_LEN};
pub use tree::{validate_name, Entry, FileMode, Tree};
