//! Commit type - a snapshot of one root tree

use super::ObjectId;
use crate::codec::{Encode, ObjectKind};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity recorded in a commit's author and committer lines
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    /// Create a validated author
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let author = Author {
            name: name.into(),
            email: email.into(),
        };
        author.validate()?;
        Ok(author)
    }

    /// Reject values that would break the `name <email>` framing
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Encoding("author name is empty".into()));
        }
        for (field, value) in [("name", &self.name), ("email", &self.email)] {
            if value.contains(['<', '>', '\n', '\0']) {
                return Err(Error::Encoding(format!(
                    "author {} {:?} contains a reserved character",
                    field, value
                )));
            }
        }
        if self.name != self.name.trim() {
            return Err(Error::Encoding(
                "author name has leading or trailing whitespace".into(),
            ));
        }
        Ok(())
    }

    fn signature(&self, timestamp: u64) -> String {
        format!("{} <{}> {}", self.name, self.email, timestamp)
    }

    /// Parse `name <email> timestamp`
    fn parse_signature(line: &str) -> Result<(Self, u64)> {
        let bad = || Error::Corruption(format!("malformed signature line: {:?}", line));

        let (identity, ts) = line.rsplit_once(' ').ok_or_else(bad)?;
        let timestamp = ts.parse::<u64>().map_err(|_| bad())?;
        let (name, rest) = identity.split_once(" <").ok_or_else(bad)?;
        let email = rest.strip_suffix('>').ok_or_else(bad)?;

        Ok((
            Author {
                name: name.to_string(),
                email: email.to_string(),
            },
            timestamp,
        ))
    }
}

/// A commit records one root tree, its author, and a message
///
/// There are no parent links: each commit stands alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the snapshot
    pub tree: ObjectId,

    pub author: Author,

    /// Free-form message, stored verbatim
    pub message: String,

    /// Timestamp (unix seconds)
    pub timestamp: u64,
}

impl Commit {
    /// Create a commit stamped with the current time
    pub fn new(tree: ObjectId, author: Author, message: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::with_timestamp(tree, author, message, timestamp)
    }

    /// Create a commit with an explicit timestamp
    pub fn with_timestamp(
        tree: ObjectId,
        author: Author,
        message: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Commit {
            tree,
            author,
            message: message.into(),
            timestamp,
        }
    }

    /// First line of the message, as shown in summaries
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| Error::Corruption("commit is not UTF-8".into()))?;
        let (headers, message) = text
            .split_once("\n\n")
            .ok_or_else(|| Error::Corruption("commit missing message separator".into()))?;

        let mut lines = headers.lines();
        let tree = ObjectId::from_hex(header_field(&mut lines, "tree")?)
            .map_err(|e| Error::Corruption(e.to_string()))?;
        let (author, timestamp) = Author::parse_signature(header_field(&mut lines, "author")?)?;
        let (committer, _) = Author::parse_signature(header_field(&mut lines, "committer")?)?;
        if lines.next().is_some() {
            return Err(Error::Corruption("commit has unexpected header lines".into()));
        }
        if committer != author {
            return Err(Error::Corruption("committer differs from author".into()));
        }

        Ok(Commit {
            tree,
            author,
            message: message.to_string(),
            timestamp,
        })
    }
}

fn header_field<'a>(lines: &mut std::str::Lines<'a>, key: &str) -> Result<&'a str> {
    lines
        .next()
        .and_then(|l| l.strip_prefix(key))
        .and_then(|l| l.strip_prefix(' '))
        .ok_or_else(|| Error::Corruption(format!("commit missing '{}' line", key)))
}

impl Encode for Commit {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        self.author.validate()?;
        let signature = self.author.signature(self.timestamp);
        Ok(format!(
            "tree {}\nauthor {}\ncommitter {}\n\n{}",
            self.tree, signature, signature, self.message
        )
        .into_bytes())
    }
}
