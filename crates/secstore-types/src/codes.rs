use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw status returned by the secure backend.
///
/// Values follow the GlobalPlatform TEE Client API. Codes this crate has no
/// name for are kept verbatim so they can still be reported.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultCode(u32);

impl ResultCode {
    pub const SUCCESS: Self = Self(0x0000_0000);
    pub const GENERIC: Self = Self(0xFFFF_0000);
    pub const ACCESS_DENIED: Self = Self(0xFFFF_0001);
    pub const CANCEL: Self = Self(0xFFFF_0002);
    pub const ACCESS_CONFLICT: Self = Self(0xFFFF_0003);
    pub const EXCESS_DATA: Self = Self(0xFFFF_0004);
    pub const BAD_FORMAT: Self = Self(0xFFFF_0005);
    pub const BAD_PARAMETERS: Self = Self(0xFFFF_0006);
    pub const BAD_STATE: Self = Self(0xFFFF_0007);
    pub const ITEM_NOT_FOUND: Self = Self(0xFFFF_0008);
    pub const NOT_IMPLEMENTED: Self = Self(0xFFFF_0009);
    pub const NOT_SUPPORTED: Self = Self(0xFFFF_000A);
    pub const NO_DATA: Self = Self(0xFFFF_000B);
    pub const OUT_OF_MEMORY: Self = Self(0xFFFF_000C);
    pub const BUSY: Self = Self(0xFFFF_000D);
    pub const COMMUNICATION: Self = Self(0xFFFF_000E);
    pub const SECURITY: Self = Self(0xFFFF_000F);
    pub const SHORT_BUFFER: Self = Self(0xFFFF_0010);
    pub const TARGET_DEAD: Self = Self(0xFFFF_3024);
    pub const STORAGE_NO_SPACE: Self = Self(0xFFFF_3041);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Symbolic name, if this is a known code.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::SUCCESS => "SUCCESS",
            Self::GENERIC => "GENERIC",
            Self::ACCESS_DENIED => "ACCESS_DENIED",
            Self::CANCEL => "CANCEL",
            Self::ACCESS_CONFLICT => "ACCESS_CONFLICT",
            Self::EXCESS_DATA => "EXCESS_DATA",
            Self::BAD_FORMAT => "BAD_FORMAT",
            Self::BAD_PARAMETERS => "BAD_PARAMETERS",
            Self::BAD_STATE => "BAD_STATE",
            Self::ITEM_NOT_FOUND => "ITEM_NOT_FOUND",
            Self::NOT_IMPLEMENTED => "NOT_IMPLEMENTED",
            Self::NOT_SUPPORTED => "NOT_SUPPORTED",
            Self::NO_DATA => "NO_DATA",
            Self::OUT_OF_MEMORY => "OUT_OF_MEMORY",
            Self::BUSY => "BUSY",
            Self::COMMUNICATION => "COMMUNICATION",
            Self::SECURITY => "SECURITY",
            Self::SHORT_BUFFER => "SHORT_BUFFER",
            Self::TARGET_DEAD => "TARGET_DEAD",
            Self::STORAGE_NO_SPACE => "STORAGE_NO_SPACE",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "ResultCode({name})"),
            None => write!(f, "ResultCode({:#x})", self.0),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{:#x} ({name})", self.0),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

impl From<u32> for ResultCode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Layer that produced a [`ResultCode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorOrigin {
    /// The client library on the host.
    Api,
    /// The communication stack between host and backend.
    Comms,
    /// The secure backend's core.
    Tee,
    /// The trusted service itself.
    TrustedApp,
    Unknown(u32),
}

impl ErrorOrigin {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Api,
            2 => Self::Comms,
            3 => Self::Tee,
            4 => Self::TrustedApp,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Self::Api => 1,
            Self::Comms => 2,
            Self::Tee => 3,
            Self::TrustedApp => 4,
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api => f.write_str("api"),
            Self::Comms => f.write_str("comms"),
            Self::Tee => f.write_str("tee"),
            Self::TrustedApp => f.write_str("trusted-app"),
            Self::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}

/// Host authentication presented when opening a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// No host credential; trust rests on the backend's own attestation.
    #[default]
    Public,
    User,
    Group,
    Application,
}

impl LoginMethod {
    pub fn raw(self) -> u32 {
        match self {
            Self::Public => 0,
            Self::User => 1,
            Self::Group => 2,
            Self::Application => 4,
        }
    }
}
