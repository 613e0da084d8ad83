//! Content-addressed object store
//!
//! Objects are stored by the BLAKE3 hash of their canonical encoding and
//! compressed with zstd. Every file is written through a temp file and an
//! atomic rename.

mod atomic;
pub mod compress;
mod head;
mod object_store;

pub use atomic::{is_temp_file, TEMP_FILE_ATTEMPTS};
pub use head::Head;
pub use object_store::ObjectStore;
