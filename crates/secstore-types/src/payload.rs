use std::fmt;

use crate::error::TypeError;

/// Fixed size, in bytes, of every object exchanged with the trusted service.
pub const OBJECT_CAPACITY: usize = 2000;

/// Opaque object contents, at most [`OBJECT_CAPACITY`] bytes.
///
/// Writes always transmit exactly `OBJECT_CAPACITY` bytes: the payload
/// followed by zero padding (see [`ObjectPayload::to_padded`]). Reads hand
/// back whatever the trusted service reported, padding included.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPayload(Vec<u8>);

impl ObjectPayload {
    /// Wrap payload bytes, rejecting anything larger than the capacity.
    pub fn new(data: impl Into<Vec<u8>>) -> Result<Self, TypeError> {
        let data = data.into();
        if data.len() > OBJECT_CAPACITY {
            return Err(TypeError::PayloadTooLarge {
                len: data.len(),
                max: OBJECT_CAPACITY,
            });
        }
        Ok(Self(data))
    }

    /// Zero-padded copy of exactly [`OBJECT_CAPACITY`] bytes.
    pub fn to_padded(&self) -> Box<[u8; OBJECT_CAPACITY]> {
        let mut buf = Box::new([0u8; OBJECT_CAPACITY]);
        buf[..self.0.len()].copy_from_slice(&self.0);
        buf
    }

    /// Bytes up to (not including) the first NUL.
    ///
    /// Stored objects are zero padded, so for text payloads this is the
    /// original text.
    pub fn text_bytes(&self) -> &[u8] {
        match self.0.iter().position(|&b| b == 0) {
            Some(end) => &self.0[..end],
            None => &self.0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<u8>> for ObjectPayload {
    type Error = TypeError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&[u8]> for ObjectPayload {
    type Error = TypeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<[u8]> for ObjectPayload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ObjectPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPayload")
            .field("len", &self.0.len())
            .field("text_len", &self.text_bytes().len())
            .finish()
    }
}
