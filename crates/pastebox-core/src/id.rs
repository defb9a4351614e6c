//! Paste and comment identifiers.
//!
//! An identifier is 4 to 64 characters drawn from `[a-z0-9_-]`. The first
//! four characters double as the shard key, so they are always present.
//! Lowercase-only keeps two distinct ids from landing on the same file on
//! case-insensitive filesystems.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PasteError, Result};

/// A validated paste (or comment) identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasteId(String);

impl PasteId {
    pub const MIN_LEN: usize = 4;
    pub const MAX_LEN: usize = 64;
    /// Length of ids produced by [`PasteId::generate`].
    pub const GENERATED_LEN: usize = 16;

    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// Returns `PasteError::InvalidId` if the length or charset is wrong.
    pub fn parse(value: &str) -> Result<Self> {
        if value.len() < Self::MIN_LEN || value.len() > Self::MAX_LEN {
            return Err(PasteError::InvalidId(format!(
                "{:?} must be {}-{} characters",
                value,
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        {
            return Err(PasteError::InvalidId(format!(
                "{:?} may only contain a-z, 0-9, '_' and '-'",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Generate a fresh 16-character hexadecimal id (64 random bits).
    pub fn generate() -> Self {
        let mut simple = Uuid::new_v4().simple().to_string();
        simple.truncate(Self::GENERATED_LEN);
        Self(simple)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-level shard key: first and second character pairs.
    pub fn shard(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PasteId {
    type Err = PasteError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PasteId {
    type Error = PasteError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for PasteId {
    type Error = PasteError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PasteId> for String {
    fn from(id: PasteId) -> Self {
        id.0
    }
}

impl AsRef<str> for PasteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_known_ids() {
        for value in [
            "testpaste123",
            "complex_meta_paste",
            "thisdoesnotexist999",
            "f468483c313401e8",
            "a-b_",
        ] {
            assert!(PasteId::parse(value).is_ok(), "{} should parse", value);
        }
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!(matches!(PasteId::parse("abc"), Err(PasteError::InvalidId(_))));
        assert!(matches!(PasteId::parse(""), Err(PasteError::InvalidId(_))));
        let long = "a".repeat(PasteId::MAX_LEN + 1);
        assert!(matches!(PasteId::parse(&long), Err(PasteError::InvalidId(_))));
    }

    #[test]
    fn test_parse_rejects_bad_charset() {
        for value in ["../etc/passwd", "ABCDEF12", "abcd.json", "ab cd", "abcdé"] {
            assert!(
                matches!(PasteId::parse(value), Err(PasteError::InvalidId(_))),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_generate_is_hex_and_valid() {
        let id = PasteId::generate();
        assert_eq!(id.as_str().len(), PasteId::GENERATED_LEN);
        assert!(id.as_str().bytes().all(|b| b.is_ascii_hexdigit()));
        assert!(PasteId::parse(id.as_str()).is_ok());
        assert_ne!(PasteId::generate(), PasteId::generate());
    }

    #[test]
    fn test_shard_uses_prefix() {
        let id = PasteId::parse("f468483c313401e8").unwrap();
        assert_eq!(id.shard(), ("f4", "68"));
    }

    #[test]
    fn test_serde_validates() {
        let id: PasteId = serde_json::from_str("\"testpaste123\"").unwrap();
        assert_eq!(id.as_str(), "testpaste123");
        assert!(serde_json::from_str::<PasteId>("\"NOPE\"").is_err());
    }
}
