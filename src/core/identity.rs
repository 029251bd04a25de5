//! Part identity using prefixed ULIDs
//!
//! Every part gets a `PART-<ULID>` identifier at creation. ULIDs sort by
//! creation time, which is what makes them a usable tie-break after
//! `createdAt` when paging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefix carried by every part identifier
pub const PART_PREFIX: &str = "PART";

/// A unique part identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId {
    ulid: Ulid,
}

impl PartId {
    /// Create a fresh identifier
    pub fn new() -> Self {
        Self { ulid: Ulid::new() }
    }

    /// Parse a part identifier, validating its format
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for PartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", PART_PREFIX, self.ulid)
    }
}

impl FromStr for PartId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if !prefix_str.eq_ignore_ascii_case(PART_PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix_str.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { ulid })
    }
}

impl Serialize for PartId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PartId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing part identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("invalid identifier prefix: '{0}' (expected PART)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in identifier: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_id_generation() {
        let id = PartId::new();
        assert!(id.to_string().starts_with("PART-"));
        assert_eq!(id.to_string().len(), 31); // PART- (5) + ULID (26)
    }

    #[test]
    fn test_part_id_parsing() {
        let original = PartId::new();
        let parsed = PartId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_part_id_prefix_is_case_insensitive() {
        let original = PartId::new();
        let lower = original.to_string().replacen("PART", "part", 1);
        assert_eq!(PartId::parse(&lower).unwrap(), original);
    }

    #[test]
    fn test_part_id_invalid_prefix() {
        let err = PartId::parse("CMP-01HQ3K4N5M6P7R8S9T0VWXYZ12").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_part_id_missing_delimiter() {
        let err = PartId::parse("PART01HQ3K4N5M6P7R8S9T0VWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_part_id_invalid_ulid() {
        let err = PartId::parse("PART-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_part_ids_order_by_creation() {
        let a = PartId {
            ulid: Ulid::from_parts(1_000, 5),
        };
        let b = PartId {
            ulid: Ulid::from_parts(2_000, 1),
        };
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }
}
