//! Blob type - raw file content

use crate::codec::{Encode, ObjectKind};
use crate::Result;

/// An immutable byte payload, typically the contents of one file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    /// Create a new blob
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Blob { data: data.into() }
    }

    /// The raw payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the blob, returning its payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Encode for Blob {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Blob
    }

    fn encode_payload(&self) -> Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}
