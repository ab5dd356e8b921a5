use std::path::{Path, PathBuf};

use secstore_types::{LoginMethod, TaUuid};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// How a read that hits a short-buffer status is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortBufferPolicy {
    /// Return [`crate::ReadOutcome::Truncated`].
    #[default]
    Report,
    /// Fail with [`ClientError::Truncated`].
    Fatal,
    /// Return [`crate::ReadOutcome::Found`] with the buffer as-is, the way
    /// older hosts did.
    Legacy,
}

/// Client settings, loadable from TOML.
///
/// ```toml
/// ta_uuid = "f4e750bb-1437-4fbf-8785-8d3580c34994"
/// login = "public"
/// short_buffer_policy = "report"
/// store_dir = "/var/lib/secstore"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Trusted service to bind sessions to.
    pub ta_uuid: TaUuid,
    pub login: LoginMethod,
    pub short_buffer_policy: ShortBufferPolicy,
    /// Root directory of the file-backed simulated backend.
    pub store_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ta_uuid: TaUuid::SECURE_STORAGE,
            login: LoginMethod::Public,
            short_buffer_policy: ShortBufferPolicy::Report,
            store_dir: PathBuf::from("/var/lib/secstore"),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(s: &str) -> ClientResult<Self> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Read a TOML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> ClientResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ClientResult<String> {
        toml::to_string(self).map_err(|e| ClientError::Config(e.to_string()))
    }
}
