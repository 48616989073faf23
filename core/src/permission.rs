//! Location permission state

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission state as reported by the host, without renaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

impl PermissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host string that is not one of the known permission states
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown permission state: {0}")]
pub struct UnknownPermissionState(pub String);

impl FromStr for PermissionState {
    type Err = UnknownPermissionState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            "prompt" => Ok(Self::Prompt),
            other => Err(UnknownPermissionState(other.to_string())),
        }
    }
}

/// Result of `check_permissions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionStatus {
    pub location: PermissionState,
}
