//! Error taxonomy for the location plugin

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message used when the permission-query capability is missing
pub const PERMISSIONS_UNAVAILABLE: &str = "Permissions API not available in this browser";

/// Message used when the geolocation capability itself is missing
pub const GEOLOCATION_UNAVAILABLE: &str = "Geolocation API not available in this browser";

/// Message used when the host drops a one-shot request without answering it
pub const REQUEST_DROPPED: &str = "Geolocation request was dropped by the host";

/// Failure code reported by the host geolocation capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum HostErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unknown(u16),
}

impl From<u16> for HostErrorCode {
    fn from(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            other => Self::Unknown(other),
        }
    }
}

impl From<HostErrorCode> for u16 {
    fn from(code: HostErrorCode) -> Self {
        match code {
            HostErrorCode::PermissionDenied => 1,
            HostErrorCode::PositionUnavailable => 2,
            HostErrorCode::Timeout => 3,
            HostErrorCode::Unknown(other) => other,
        }
    }
}

impl fmt::Display for HostErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "PERMISSION_DENIED"),
            Self::PositionUnavailable => write!(f, "POSITION_UNAVAILABLE"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::Unknown(code) => write!(f, "UNKNOWN({})", code),
        }
    }
}

/// Failure reported by the host capability, carried through unchanged
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct HostError {
    pub code: HostErrorCode,
    pub message: String,
}

impl HostError {
    pub fn new(code: impl Into<HostErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by every plugin operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// A required host capability does not exist in this environment
    #[error("{0}")]
    Unavailable(String),

    /// The host capability reported a failure
    #[error(transparent)]
    Host(#[from] HostError),

    /// The operation is not supported on this platform
    #[error("{0}")]
    NotImplemented(String),
}

impl LocationError {
    pub fn not_implemented_on(platform: &str) -> Self {
        Self::NotImplemented(format!("Not implemented on {}.", platform))
    }

    pub fn host_code(&self) -> Option<HostErrorCode> {
        match self {
            Self::Host(e) => Some(e.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LocationError>;
