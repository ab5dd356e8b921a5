use std::fmt;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of an object key in bytes.
pub const MAX_KEY_LEN: usize = 64;

/// Hex characters kept from the namespace digest by [`ObjectKey::namespaced`].
pub const HASHED_NAMESPACE_LEN: usize = 20;

/// Textual identifier of a stored object.
///
/// The trusted service uses the key bytes verbatim as the object id. A key
/// is 1 to [`MAX_KEY_LEN`] bytes long and never contains a NUL byte, so an
/// `ObjectKey` that exists is always safe to send over a session.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Validate and wrap a key.
    pub fn new(key: impl Into<String>) -> Result<Self, TypeError> {
        let key = key.into();
        if key.is_empty() {
            return Err(TypeError::EmptyKey);
        }
        if key.len() > MAX_KEY_LEN {
            return Err(TypeError::KeyTooLong {
                len: key.len(),
                max: MAX_KEY_LEN,
            });
        }
        if key.as_bytes().contains(&0) {
            return Err(TypeError::KeyContainsNul);
        }
        Ok(Self(key))
    }

    /// Build a `"{namespace}/{name}"` key that fits the key length limit.
    ///
    /// Same as [`ObjectKey::namespaced_all`] with a single name.
    pub fn namespaced(namespace: &str, name: &str) -> Result<Self, TypeError> {
        let mut keys = Self::namespaced_all(namespace, &[name])?;
        keys.pop().ok_or(TypeError::EmptyKey)
    }

    /// Build `"{namespace}/{name}"` keys for a group of names.
    ///
    /// Namespaces (device or thing names, say) can be arbitrarily long. If any
    /// joined key reaches [`MAX_KEY_LEN`], the namespace of *every* key in the
    /// group is replaced by the first [`HASHED_NAMESPACE_LEN`] hex characters
    /// of its MD5 digest, so one namespace always maps to one prefix. A name
    /// that is too long on its own is still an error.
    pub fn namespaced_all(namespace: &str, names: &[&str]) -> Result<Vec<Self>, TypeError> {
        let too_long = names
            .iter()
            .any(|name| namespace.len() + 1 + name.len() >= MAX_KEY_LEN);
        let prefix = if too_long {
            let digest = hex::encode(Md5::digest(namespace.as_bytes()));
            digest[..HASHED_NAMESPACE_LEN].to_string()
        } else {
            namespace.to_string()
        };
        names
            .iter()
            .map(|name| Self::new(format!("{prefix}/{name}")))
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key bytes as sent to the trusted service (no terminator).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ObjectKey {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::str::FromStr for ObjectKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:?})", self.0)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
