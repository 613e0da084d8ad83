//! Canonical object encoding
//!
//! Every stored object is framed the same way:
//! ```text
//! <type-tag> <payload-length>\0<payload>
//! ```
//! The tag is `blob`, `tree` or `commit` and the length is the decimal byte
//! count of the payload. Ids are computed over exactly these bytes, before
//! compression.

use crate::model::{Blob, Commit, ObjectId, Tree};
use crate::{Error, Result};
use std::fmt;

/// Type tag written in an object's header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }

    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(ObjectKind::Blob),
            b"tree" => Some(ObjectKind::Tree),
            b"commit" => Some(ObjectKind::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can be turned into canonical object bytes
pub trait Encode {
    /// Tag written in the header
    fn kind(&self) -> ObjectKind;

    /// Payload bytes, without the header
    fn encode_payload(&self) -> Result<Vec<u8>>;

    /// Full canonical encoding: header followed by payload
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(frame(self.kind(), &self.encode_payload()?))
    }

    /// Content address of the canonical encoding
    fn id(&self) -> Result<ObjectId> {
        Ok(ObjectId::digest(&self.encode()?))
    }
}

/// Prefix a payload with its type-tagged header
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let header = format!("{} {}\0", kind, payload.len());
    let mut out = Vec::with_capacity(header.len() + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Split canonical bytes into their kind and payload, checking the length
pub fn unframe(bytes: &[u8]) -> Result<(ObjectKind, &[u8])> {
    let nul = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::Corruption("object header not terminated".into()))?;
    let header = &bytes[..nul];
    let payload = &bytes[nul + 1..];

    let space = header
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::Corruption("object header missing length".into()))?;
    let kind = ObjectKind::from_tag(&header[..space]).ok_or_else(|| {
        Error::Corruption(format!(
            "unknown object type {:?}",
            String::from_utf8_lossy(&header[..space])
        ))
    })?;

    let declared: usize = std::str::from_utf8(&header[space + 1..])
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Corruption("object header has invalid length".into()))?;
    if declared != payload.len() {
        return Err(Error::Corruption(format!(
            "{} declares {} bytes but has {}",
            kind,
            declared,
            payload.len()
        )));
    }

    Ok((kind, payload))
}

/// A decoded object of any kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    /// Decode canonical bytes produced by [`Encode::encode`]
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (kind, payload) = unframe(bytes)?;
        Ok(match kind {
            ObjectKind::Blob => Object::Blob(Blob::new(payload)),
            ObjectKind::Tree => Object::Tree(Tree::decode_payload(payload)?),
            ObjectKind::Commit => Object::Commit(Commit::decode_payload(payload)?),
        })
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }
}

impl Encode for Object {
    fn kind(&self) -> ObjectKind {
        match self {
            Object::Blob(b) => b.kind(),
            Object::Tree(t) => t.kind(),
            Object::Commit(c) => c.kind(),
        }
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        match self {
            Object::Blob(b) => b.encode_payload(),
            Object::Tree(t) => t.encode_payload(),
            Object::Commit(c) => c.encode_payload(),
        }
    }
}
