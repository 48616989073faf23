//! Position results reported by the host capability
//!
//! Values are copied from the host as-is; nothing here interprets or
//! corrects them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinates of a single position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Accuracy of latitude/longitude in meters
    pub accuracy: f64,
    /// Altitude in meters, when the host can determine it
    pub altitude: Option<f64>,
    /// Accuracy of the altitude in meters
    pub altitude_accuracy: Option<f64>,
    /// Ground speed in meters per second
    pub speed: Option<f64>,
    /// Direction of travel in degrees clockwise from true north
    pub heading: Option<f64>,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            altitude: None,
            altitude_accuracy: None,
            speed: None,
            heading: None,
        }
    }
}

/// A position fix as produced by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub coords: Coordinates,
    /// Milliseconds since the Unix epoch at which the fix was taken
    pub timestamp: f64,
}

impl Position {
    pub fn new(coords: Coordinates, timestamp: f64) -> Self {
        Self { coords, timestamp }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) ±{}m @{}",
            self.coords.latitude, self.coords.longitude, self.coords.accuracy, self.timestamp
        )
    }
}

/// Identifier naming one active watch: the decimal string of the host's
/// numeric handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackId(String);

impl CallbackId {
    pub fn from_handle(handle: i32) -> Self {
        Self(handle.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the host handle from an identifier string.
    ///
    /// Mirrors `parseInt(s, 10)`: leading whitespace and one sign are skipped,
    /// then the longest run of decimal digits is read. A string with no digits
    /// (NaN) becomes `0`, the value a WebIDL `long` receives for NaN. Values
    /// outside `i32` wrap modulo 2^32, as the WebIDL conversion does.
    pub fn parse_handle(id: &str) -> i32 {
        let trimmed = id.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let mut value: u32 = 0;
        for b in rest.bytes().take_while(u8::is_ascii_digit) {
            value = value.wrapping_mul(10).wrapping_add(u32::from(b - b'0'));
        }

        let value = value as i32;
        if negative {
            value.wrapping_neg()
        } else {
            value
        }
    }

    pub fn handle(&self) -> i32 {
        Self::parse_handle(&self.0)
    }
}

impl From<String> for CallbackId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CallbackId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_id_is_decimal_handle() {
        assert_eq!(CallbackId::from_handle(42).as_str(), "42");
        assert_eq!(CallbackId::from_handle(-7).as_str(), "-7");
    }

    #[test]
    fn test_parse_handle_numeric() {
        assert_eq!(CallbackId::parse_handle("17"), 17);
        assert_eq!(CallbackId::parse_handle("  17"), 17);
        assert_eq!(CallbackId::parse_handle("-3"), -3);
        assert_eq!(CallbackId::parse_handle("+9"), 9);
    }

    #[test]
    fn test_parse_handle_trailing_garbage() {
        assert_eq!(CallbackId::parse_handle("12abc"), 12);
        assert_eq!(CallbackId::parse_handle("5.9"), 5);
    }

    #[test]
    fn test_parse_handle_non_numeric_is_zero() {
        assert_eq!(CallbackId::parse_handle("abc"), 0);
        assert_eq!(CallbackId::parse_handle(""), 0);
        assert_eq!(CallbackId::parse_handle("-"), 0);
    }

    #[test]
    fn test_position_serializes_camel_case() {
        let mut coords = Coordinates::new(40.0, -73.0, 5.0);
        coords.altitude_accuracy = Some(3.0);
        let json = serde_json::to_value(Position::new(coords, 1000.0)).unwrap();
        assert_eq!(json["coords"]["altitudeAccuracy"], 3.0);
        assert!(json["coords"]["speed"].is_null());
        assert_eq!(json["timestamp"], 1000.0);
    }
}
