//! Content-addressed object identifier using BLAKE3

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of raw bytes in an [`ObjectId`]
pub const ID_LEN: usize = 32;

/// Number of hex characters in a rendered [`ObjectId`]
pub const HEX_LEN: usize = ID_LEN * 2;

/// A 32-byte BLAKE3 digest naming one stored object
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    /// Create an id from raw digest bytes
    pub fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        ObjectId(bytes)
    }

    /// Address canonical object bytes
    pub fn digest(data: &[u8]) -> Self {
        ObjectId(*blake3::hash(data).as_bytes())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Convert to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        if s.len() != HEX_LEN {
            return Err(crate::Error::InvalidId(format!(
                "expected {} hex characters, got {}",
                HEX_LEN,
                s.len()
            )));
        }
        let mut arr = [0u8; ID_LEN];
        hex::decode_to_slice(s, &mut arr)
            .map_err(|e| crate::Error::InvalidId(format!("{}: {}", s, e)))?;
        Ok(ObjectId(arr))
    }

    /// Short prefix for display (first 7 chars)
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }

    /// Split the hex form into the shard directory and file name
    pub fn shard(&self) -> (String, String) {
        let hex = self.to_hex();
        let (dir, file) = hex.split_at(2);
        (dir.to_string(), file.to_string())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short())
    }
}

impl FromStr for ObjectId {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        ObjectId::from_hex(s)
    }
}

impl TryFrom<String> for ObjectId {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        ObjectId::from_hex(&s)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> String {
        id.to_hex()
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
