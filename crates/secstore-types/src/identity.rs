use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypeError;

/// Identity of the trusted service a session binds to.
///
/// The backend resolves the service by this UUID when a session is opened.
/// The default is the identity the secure storage service is built with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaUuid(Uuid);

impl TaUuid {
    /// Built-in identity of the secure storage trusted service.
    pub const SECURE_STORAGE: Self = Self(Uuid::from_u128(0xf4e750bb_1437_4fbf_8785_8d3580c34994));

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaUuid {
    fn default() -> Self {
        Self::SECURE_STORAGE
    }
}

impl FromStr for TaUuid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidUuid(e.to_string()))
    }
}

impl fmt::Debug for TaUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaUuid({})", self.0)
    }
}

impl fmt::Display for TaUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Commands exposed by the secure storage trusted service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// `[in key, out buffer]`
    ReadRaw,
    /// `[in key, in buffer]`
    WriteRaw,
    /// `[in key]`
    Delete,
}

impl Command {
    pub fn id(self) -> u32 {
        match self {
            Self::ReadRaw => 0,
            Self::WriteRaw => 1,
            Self::Delete => 2,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::ReadRaw),
            1 => Some(Self::WriteRaw),
            2 => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ReadRaw => "READ_RAW",
            Self::WriteRaw => "WRITE_RAW",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
