//! Fixed-size listing names.

use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte listing name, the unique key of a registry entry.
///
/// Shorter inputs are right-padded with zero bytes, so `"abc"` and
/// `"abc\0"` name the same listing. Serializes as its [`Display`](fmt::Display)
/// form: the text itself, or `0x`-prefixed hex for binary names.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListingName([u8; 32]);

impl ListingName {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build a name from up to 32 bytes, zero-padding the remainder.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        if bytes.len() > Self::LEN {
            return Err(TypesError::NameTooLong {
                len: bytes.len(),
                max: Self::LEN,
            });
        }
        let mut out = [0u8; 32];
        out[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Build a name from a UTF-8 string (the `fromAscii` convention).
    pub fn from_text(text: &str) -> Result<Self, TypesError> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The name without its zero padding, if it is printable text.
    pub fn as_text(&self) -> Option<&str> {
        let end = self.0.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        let text = std::str::from_utf8(&self.0[..end]).ok()?;
        if text.chars().all(|c| !c.is_control()) {
            Some(text)
        } else {
            None
        }
    }
}

impl fmt::Debug for ListingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "ListingName({:?})", text),
            None => write!(f, "ListingName({})", hex::encode(&self.0[..4])),
        }
    }
}

impl fmt::Display for ListingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl FromStr for ListingName {
    type Err = TypesError;

    /// Parses the output of `Display`. A `0x` prefix followed by exactly 64
    /// hex digits is raw bytes; anything else is text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix("0x") {
            if digits.len() == Self::LEN * 2 {
                if let Ok(bytes) = hex::decode(digits) {
                    return Self::from_bytes(&bytes);
                }
            }
        }
        Self::from_text(s)
    }
}

impl Serialize for ListingName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ListingName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_zero_padded() {
        let name = ListingName::from_text("DemoListing").unwrap();
        assert_eq!(&name.as_bytes()[..11], b"DemoListing");
        assert!(name.as_bytes()[11..].iter().all(|b| *b == 0));
        assert_eq!(name.as_text(), Some("DemoListing"));
        assert_eq!(name.to_string(), "DemoListing");
    }

    #[test]
    fn over_long_names_are_rejected() {
        let long = "x".repeat(33);
        assert!(matches!(
            ListingName::from_text(&long),
            Err(TypesError::NameTooLong { len: 33, max: 32 })
        ));
    }

    #[test]
    fn binary_names_display_as_hex() {
        let name = ListingName::new([0xff; 32]);
        assert_eq!(name.as_text(), None);
        assert!(name.to_string().starts_with("0xffff"));
    }

    #[test]
    fn serializes_as_text_or_hex() {
        let name = ListingName::from_text("DemoListing").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"DemoListing\"");

        let binary = ListingName::new([0xab; 32]);
        let json = serde_json::to_string(&binary).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(32)));
        let back: ListingName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, binary);
    }

    #[test]
    fn parse_rejects_long_text() {
        assert!("y".repeat(40).parse::<ListingName>().is_err());
        assert_eq!("0x12".parse::<ListingName>().unwrap().as_text(), Some("0x12"));
    }

    #[test]
    fn zero_name() {
        assert!(ListingName::from_bytes(&[]).unwrap().is_zero());
    }
}
