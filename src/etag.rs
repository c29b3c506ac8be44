//! Document version tokens.
//!
//! An [`Etag`] is 16 bytes: a 64-bit resource type followed by a 64-bit
//! change counter. The text form is upper-case hex grouped like a GUID:
//!
//! ```text
//! 01000000-0000-0001-0000-000000000007
//! └restype─────────┘ └changes─────────┘
//! ```
//!
//! The all-zero value is the canonical empty etag used whenever a response
//! carries no version.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Opaque, ordered version token of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Etag {
    restype: u64,
    changes: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EtagParseError {
    #[error("etag must have 32 hex digits, got {0}")]
    Length(usize),
    #[error("etag contains non-hex characters")]
    Hex,
}

impl Etag {
    pub const fn new(restype: u64, changes: u64) -> Self {
        Self { restype, changes }
    }

    pub const fn empty() -> Self {
        Self::new(0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.restype == 0 && self.changes == 0
    }

    pub fn restype(&self) -> u64 {
        self.restype
    }

    pub fn changes(&self) -> u64 {
        self.changes
    }

    /// The next etag for the same resource type.
    pub fn increment(&self) -> Self {
        Self::new(self.restype, self.changes.wrapping_add(1))
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.restype.to_be_bytes());
        out[8..].copy_from_slice(&self.changes.to_be_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut restype = [0u8; 8];
        let mut changes = [0u8; 8];
        restype.copy_from_slice(&bytes[..8]);
        changes.copy_from_slice(&bytes[8..]);
        Self::new(u64::from_be_bytes(restype), u64::from_be_bytes(changes))
    }

    /// Read the `ETag` response header.
    ///
    /// Surrounding quotes and a weak `W/` prefix are stripped. An absent or
    /// unparseable header yields [`Etag::empty`].
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::empty();
        };
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let unquoted = trimmed.trim_matches('"');
        match unquoted.parse() {
            Ok(etag) => etag,
            Err(e) => {
                tracing::debug!(
                    header = raw,
                    error = %e,
                    "unparseable ETag header, using empty etag"
                );
                Self::empty()
            }
        }
    }
}

impl FromStr for Etag {
    type Err = EtagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return Err(EtagParseError::Length(digits.len()));
        }
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(&digits, &mut bytes).map_err(|_| EtagParseError::Hex)?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = hex::encode_upper(self.to_bytes());
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &h[0..8],
            &h[8..12],
            &h[12..16],
            &h[16..20],
            &h[20..32]
        )
    }
}

impl Serialize for Etag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Etag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_layout() {
        let etag = Etag::new(0x0100_0000_0000_0001, 7);
        assert_eq!(etag.to_string(), "01000000-0000-0001-0000-000000000007");
    }

    #[test]
    fn test_parse_accepts_lowercase_and_no_dashes() {
        let a: Etag = "01000000-0000-0001-0000-00000000000a".parse().unwrap();
        let b: Etag = "0100000000000001000000000000000A".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.changes(), 10);
        assert_eq!(a.restype(), 0x0100_0000_0000_0001);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("1234".parse::<Etag>(), Err(EtagParseError::Length(4)));
        assert_eq!(
            "zz000000-0000-0001-0000-000000000007".parse::<Etag>(),
            Err(EtagParseError::Hex)
        );
    }

    #[test]
    fn test_empty() {
        assert!(Etag::empty().is_empty());
        assert_eq!(Etag::empty(), Etag::default());
        assert_eq!(
            Etag::empty().to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_from_header() {
        let expected = Etag::new(0x0100_0000_0000_0001, 7);
        assert_eq!(
            Etag::from_header(Some("\"01000000-0000-0001-0000-000000000007\"")),
            expected
        );
        assert_eq!(
            Etag::from_header(Some("W/\"01000000-0000-0001-0000-000000000007\"")),
            expected
        );
        assert_eq!(Etag::from_header(Some("garbage")), Etag::empty());
        assert_eq!(Etag::from_header(None), Etag::empty());
    }

    #[test]
    fn test_ordering_follows_changes() {
        let a = Etag::new(1, 5);
        assert!(a < a.increment());
        assert!(Etag::new(1, u64::MAX) < Etag::new(2, 0));
    }

    #[test]
    fn test_serde_as_string() {
        let etag = Etag::new(1, 2);
        let v = serde_json::to_value(etag).unwrap();
        assert_eq!(v, serde_json::json!("00000000-0000-0001-0000-000000000002"));
        let back: Etag = serde_json::from_value(v).unwrap();
        assert_eq!(back, etag);
    }
}
