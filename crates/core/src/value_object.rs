//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Two instances
/// with the same attributes are interchangeable; to "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Product name in its canonical lookup form.
///
/// Lower-cased, trimmed, and with every run of whitespace collapsed to a single
/// ASCII space, so `"Milk"`, `"  milk  "` and `"MILK"` are the same key.
/// The original display text of a product is kept separately; this type is only
/// ever used as a key or a search term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn new(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        Self(lowered.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bidirectional substring match used by product search.
    ///
    /// A short query matches a longer stored name, and a long query still
    /// matches a stored abbreviation.
    pub fn matches_bidirectional(&self, other: &NormalizedName) -> bool {
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl ValueObject for NormalizedName {}

impl core::fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NormalizedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
