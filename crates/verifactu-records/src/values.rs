//! Validated wire-format value types.
//!
//! Amounts, rates and digests travel as exact strings: the byte sequence
//! that was validated is the byte sequence that gets encoded and digested.
//! Nothing here reformats or re-rounds a value after it has been accepted.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::rules::Violation;

/// Monetary amount in the authority's wire form: `-?\d{1,12}\.\d{2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    /// Parses a validated amount from its wire text.
    pub fn parse(value: impl Into<String>) -> Result<Self, Violation> {
        let s = value.into();
        let re = Regex::new(r"^-?\d{1,12}\.\d{2}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(Violation::pattern("amount.format", "amount", &s));
        }
        Ok(Self(s))
    }

    /// Exact wire text of this amount.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, for tolerance arithmetic only.
    pub fn value(&self) -> f64 {
        self.0.parse().expect("amount validated on construction")
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(s).map_err(serde::de::Error::custom)
    }
}

/// Tax rate percentage in the wire form `\d{1,3}\.\d{2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaxRate(String);

impl TaxRate {
    /// Parses a validated rate from its wire text.
    pub fn parse(value: impl Into<String>) -> Result<Self, Violation> {
        let s = value.into();
        let re = Regex::new(r"^\d{1,3}\.\d{2}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(Violation::pattern("tax-rate.format", "tax_rate", &s));
        }
        Ok(Self(s))
    }

    /// Exact wire text of this rate.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, for tolerance arithmetic only.
    pub fn value(&self) -> f64 {
        self.0.parse().expect("tax rate validated on construction")
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaxRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TaxRate::parse(s).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 record digest: exactly 64 uppercase hexadecimal characters.
///
/// Any other casing or length is rejected outright, never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordHash(String);

impl RecordHash {
    /// Parses a validated digest from its hexadecimal text.
    pub fn parse(value: impl Into<String>) -> Result<Self, Violation> {
        let s = value.into();
        let re = Regex::new(r"^[0-9A-F]{64}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(Violation::pattern("hash.format", "hash", &s));
        }
        Ok(Self(s))
    }

    /// Exact hexadecimal text of this digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        RecordHash::parse(s).map_err(serde::de::Error::custom)
    }
}
