//! zstd compression for object files
//!
//! Objects are small and numerous, so the default level trades ratio for
//! speed. Ids are always computed before compression, so changing the level
//! never changes an address.

use crate::{Error, Result};

/// Default zstd level used for new objects
pub const DEFAULT_LEVEL: i32 = 1;

/// Compress canonical object bytes for storage
pub fn compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level).map_err(Error::Compression)
}

/// Reverse [`compress`]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data).map_err(Error::Compression)
}
