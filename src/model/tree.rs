//! Tree type - one directory level
//!
//! Entries are kept in a `BTreeMap` keyed by name, so iteration order is the
//! canonical order and insertion order never leaks into the encoding.
//!
//! Entry wire format, repeated with no separator:
//! ```text
//! <mode> <name>\0<32 raw id bytes>
//! ```
//! Names can't contain `/` or NUL, which makes the NUL an unambiguous
//! terminator and the id fixed-width.

use super::id::{ObjectId, ID_LEN};
use crate::codec::{Encode, ObjectKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mode tag recorded for each tree entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    /// Normal file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Subtree (40000)
    Directory,
}

impl FileMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileMode::Regular => "100644",
            FileMode::Executable => "100755",
            FileMode::Directory => "40000",
        }
    }

    pub fn parse(s: &[u8]) -> Option<Self> {
        match s {
            b"100644" => Some(FileMode::Regular),
            b"100755" => Some(FileMode::Executable),
            b"40000" => Some(FileMode::Directory),
            _ => None,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, FileMode::Directory)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One child of a tree: a basename plus the id of the object it names
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub id: ObjectId,
    pub mode: FileMode,
}

impl Entry {
    /// Create a regular-file entry
    pub fn new(name: impl Into<String>, id: ObjectId) -> Self {
        Self::with_mode(name, id, FileMode::Regular)
    }

    /// Create an entry with an explicit mode
    pub fn with_mode(name: impl Into<String>, id: ObjectId, mode: FileMode) -> Self {
        Entry {
            name: name.into(),
            id,
            mode,
        }
    }

    /// Create an entry pointing at a subtree
    pub fn directory(name: impl Into<String>, id: ObjectId) -> Self {
        Self::with_mode(name, id, FileMode::Directory)
    }
}

/// Check that a name is a single path component safe to embed in a tree
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Encoding("tree entry name is empty".into()));
    }
    if name == "." || name == ".." {
        return Err(Error::Encoding(format!("tree entry name '{}' is reserved", name)));
    }
    if name.contains('/') || name.contains('\0') {
        return Err(Error::Encoding(format!(
            "tree entry name {:?} must be a single path component without NUL",
            name
        )));
    }
    Ok(())
}

/// A directory listing, canonically ordered by entry name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, Entry>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from entries in any order
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self> {
        let mut tree = Tree::new();
        for entry in entries {
            tree.insert(entry)?;
        }
        Ok(tree)
    }

    /// Add an entry, rejecting invalid or duplicate names
    pub fn insert(&mut self, entry: Entry) -> Result<()> {
        validate_name(&entry.name)?;
        if self.entries.contains_key(&entry.name) {
            return Err(Error::Encoding(format!(
                "duplicate tree entry name '{}'",
                entry.name
            )));
        }
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Entries in canonical (name) order
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild a tree from its encoded payload
    pub(crate) fn decode_payload(mut payload: &[u8]) -> Result<Self> {
        let mut tree = Tree::new();
        while !payload.is_empty() {
            let space = payload
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| Error::Corruption("tree entry missing mode separator".into()))?;
            let mode = FileMode::parse(&payload[..space]).ok_or_else(|| {
                Error::Corruption(format!(
                    "unknown tree entry mode {:?}",
                    String::from_utf8_lossy(&payload[..space])
                ))
            })?;
            payload = &payload[space + 1..];

            let nul = payload
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| Error::Corruption("tree entry name not terminated".into()))?;
            let name = std::str::from_utf8(&payload[..nul])
                .map_err(|_| Error::Corruption("tree entry name is not UTF-8".into()))?
                .to_string();
            payload = &payload[nul + 1..];

            if payload.len() < ID_LEN {
                return Err(Error::Corruption(format!(
                    "tree entry '{}' has truncated id",
                    name
                )));
            }
            let mut raw = [0u8; ID_LEN];
            raw.copy_from_slice(&payload[..ID_LEN]);
            payload = &payload[ID_LEN..];

            tree.insert(Entry::with_mode(name, ObjectId::from_bytes(raw), mode))
                .map_err(|e| Error::Corruption(e.to_string()))?;
        }
        Ok(tree)
    }
}

impl Encode for Tree {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for entry in self.entries.values() {
            out.extend_from_slice(entry.mode.as_str().as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.name.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.id.as_bytes());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(seed: &str) -> ObjectId {
        ObjectId::digest(seed.as_bytes())
    }

    #[test]
    fn test_entries_sorted_regardless_of_insertion_order() {
        let forward = Tree::from_entries([
            Entry::new("a.txt", id("a")),
            Entry::new("b.txt", id("b")),
        ])
        .unwrap();
        let reverse = Tree::from_entries([
            Entry::new("b.txt", id("b")),
            Entry::new("a.txt", id("a")),
        ])
        .unwrap();

        let encoded = reverse.encode().unwrap();
        assert_eq!(forward.encode().unwrap(), encoded);

        let a_pos = encoded.windows(5).position(|w| w == b"a.txt").unwrap();
        let b_pos = encoded.windows(5).position(|w| w == b"b.txt").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_empty_tree_encoding() {
        assert_eq!(Tree::new().encode().unwrap(), b"tree 0\0");
    }

    #[test]
    fn test_entry_layout() {
        let child = id("child");
        let tree = Tree::from_entries([Entry::new("f", child)]).unwrap();

        let mut expected = b"100644 f\0".to_vec();
        expected.extend_from_slice(child.as_bytes());
        assert_eq!(tree.encode_payload().unwrap(), expected);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut tree = Tree::new();
        tree.insert(Entry::new("same", id("1"))).unwrap();
        let err = tree.insert(Entry::new("same", id("2"))).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_invalid_names_rejected() {
        for name in ["", ".", "..", "a/b", "nul\0name"] {
            let err = Tree::from_entries([Entry::new(name, id("x"))]).unwrap_err();
            assert!(matches!(err, Error::Encoding(_)), "{:?} accepted", name);
        }
    }

    #[test]
    fn test_mode_changes_encoding() {
        let plain = Tree::from_entries([Entry::new("run", id("x"))]).unwrap();
        let exec =
            Tree::from_entries([Entry::with_mode("run", id("x"), FileMode::Executable)]).unwrap();
        assert_ne!(plain.id().unwrap(), exec.id().unwrap());
    }

    #[test]
    fn test_decode_payload_restores_entries() {
        let tree = Tree::from_entries([
            Entry::directory("src", id("src")),
            Entry::with_mode("build.sh", id("sh"), FileMode::Executable),
            Entry::new("name with spaces", id("sp")),
        ])
        .unwrap();

        let decoded = Tree::decode_payload(&tree.encode_payload().unwrap()).unwrap();
        assert_eq!(decoded, tree);
        assert!(decoded.get("src").unwrap().mode.is_tree());
    }

    #[test]
    fn test_decode_payload_rejects_truncated_id() {
        let mut payload = b"100644 f\0".to_vec();
        payload.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            Tree::decode_payload(&payload),
            Err(Error::Corruption(_))
        ));
    }
}
