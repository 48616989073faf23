//! Position request options
//!
//! Callers hand in a partial [`PositionOptions`]; the host always receives a
//! fully populated [`ResolvedPositionOptions`] built by overlaying the
//! caller's fields on the plugin defaults.

use serde::{Deserialize, Serialize};

/// Default request timeout handed to the host, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// Convert a JS number the way WebIDL converts a `[Clamp] unsigned long`:
/// NaN is 0, values clamp to `0..=u32::MAX`, and ties round to even.
///
/// Browsers apply this to `timeout` and `maximumAge`, so callers may pass
/// `Infinity`, negative, or fractional values.
pub fn clamp_unsigned_long(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.clamp(0.0, u32::MAX as f64);
    let floor = clamped.floor();
    let rounded = match clamped - floor {
        d if d < 0.5 => floor,
        d if d > 0.5 => floor + 1.0,
        _ if floor % 2.0 == 0.0 => floor,
        _ => floor + 1.0,
    };
    rounded as u32
}

/// Caller-supplied options. Every field is optional; unset fields keep the
/// plugin default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionOptions {
    /// Ask the host for its most accurate source (GPS rather than network)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_high_accuracy: Option<bool>,
    /// Upper bound the host may take to produce a position, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    /// Maximum age of a cached position the host may return, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_age: Option<u32>,
}

impl PositionOptions {
    pub fn with_high_accuracy(mut self, enable: bool) -> Self {
        self.enable_high_accuracy = Some(enable);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_maximum_age(mut self, maximum_age_ms: u32) -> Self {
        self.maximum_age = Some(maximum_age_ms);
        self
    }
}

/// Options exactly as forwarded to the host capability.
///
/// Values are never validated or clamped; whatever the caller asked for is
/// what the host sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: u32,
    pub maximum_age: u32,
}

impl Default for ResolvedPositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: false,
            timeout: DEFAULT_TIMEOUT_MS,
            maximum_age: 0,
        }
    }
}

impl ResolvedPositionOptions {
    /// Shallow overlay of `overrides` on `self`: set fields win, unset fields
    /// keep the value already in `self`.
    pub fn merge(self, overrides: &PositionOptions) -> Self {
        Self {
            enable_high_accuracy: overrides
                .enable_high_accuracy
                .unwrap_or(self.enable_high_accuracy),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            maximum_age: overrides.maximum_age.unwrap_or(self.maximum_age),
        }
    }

    /// Overlay optional caller options, treating `None` as "no overrides".
    pub fn merge_optional(self, overrides: Option<&PositionOptions>) -> Self {
        match overrides {
            Some(o) => self.merge(o),
            None => self,
        }
    }
}
