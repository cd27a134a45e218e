//! Product identifiers.
//!
//! Identifiers follow the catalog convention `P` + zero-padded number
//! (`P001`, `P037`, `P1200`). New identifiers are minted by taking the highest
//! identifier known to the system of record and incrementing its numeric part.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a canonical product.
///
/// Wraps the textual identifier as stored by the system of record. Identifiers
/// supplied by callers are not required to follow the `P###` convention; only
/// minted identifiers are guaranteed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Prefix of every minted identifier.
    pub const PREFIX: &'static str = "P";

    /// Minimum width of the zero-padded numeric part.
    pub const WIDTH: usize = 3;

    /// Digits kept from a millisecond timestamp in degraded identifiers.
    const TIMESTAMP_DIGITS: usize = 6;

    /// Wrap an identifier without validation (trusted sources: store rows, fixtures).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// First identifier of an empty catalog (`P001`).
    pub fn first() -> Self {
        Self::from_sequence(1)
    }

    /// `P` + `n` zero-padded to [`Self::WIDTH`] digits. Wider numbers are not truncated.
    pub fn from_sequence(n: u64) -> Self {
        Self(format!("{}{:0width$}", Self::PREFIX, n, width = Self::WIDTH))
    }

    /// Degraded identifier derived from a wall-clock timestamp.
    ///
    /// Uses the last six decimal digits of `millis`. Plausible-looking but not
    /// globally unique: two syntheses within the same millisecond (or 1000 s
    /// apart) collide.
    pub fn from_timestamp_millis(millis: i64) -> Self {
        let digits = millis.unsigned_abs().to_string();
        let tail = &digits[digits.len().saturating_sub(Self::TIMESTAMP_DIGITS)..];
        Self(format!("{}{}", Self::PREFIX, tail))
    }

    /// Numeric part of the identifier: every non-digit character stripped.
    ///
    /// Returns 0 when no digits remain or the digits overflow `u64`.
    pub fn numeric_part(&self) -> u64 {
        let digits: String = self.0.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    }

    /// Whether this identifier follows the minting convention: [`Self::PREFIX`]
    /// followed by at least one ASCII digit and nothing else.
    ///
    /// Legacy identifiers (`SKU-0005`, `legacy`) do not take part in minting.
    pub fn is_sequenced(&self) -> bool {
        self.0
            .strip_prefix(Self::PREFIX)
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    }

    /// The identifier that follows this one in the minting sequence.
    pub fn successor(&self) -> Self {
        Self::from_sequence(self.numeric_part().saturating_add(1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ProductId> for String {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ProductId: empty identifier"));
        }
        Ok(Self(trimmed.to_string()))
    }
}
