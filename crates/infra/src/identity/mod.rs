//! Product identity resolution.
//!
//! **Responsibility:** turn partial product references (name only, id only)
//! into complete `{id, name, category}` records, and mint identifiers for
//! names the catalog has never seen.
//!
//! The cache is an explicitly constructed value owned by the serving layer;
//! share it with `Arc`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mandi_products::{CanonicalProduct, ProductDescriptor, fallback_catalog};

mod cache;
mod synthesis;

pub use cache::ProductIdentityCache;

/// Default freshness window of a cache load.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Configuration for [`ProductIdentityCache`].
#[derive(Debug, Clone)]
pub struct IdentityCacheConfig {
    /// Maximum age of a load before the next lookup triggers a refresh.
    pub freshness_window: Duration,
    /// Loaded instead of the store's contents when the store cannot be reached.
    pub fallback: Vec<CanonicalProduct>,
}

impl Default for IdentityCacheConfig {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            fallback: fallback_catalog(),
        }
    }
}

impl IdentityCacheConfig {
    pub fn with_freshness_window(mut self, window: Duration) -> Self {
        self.freshness_window = window;
        self
    }

    pub fn with_fallback(mut self, fallback: Vec<CanonicalProduct>) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Freshness of the cache contents, derived lazily from the last load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheFreshness {
    /// Never loaded.
    Empty,
    Fresh,
    /// Older than the freshness window; the next lookup reloads.
    Stale,
}

/// Where the current cache generation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    Store,
    Fallback,
}

/// How a descriptor was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Resolution {
    /// Both id and name were supplied; the pairing is trusted as-is.
    Passthrough,
    /// Completed from a cache entry.
    Matched,
    /// Id-only reference with no cache entry; returned unchanged.
    Unmatched,
    /// Name-only reference with no cache entry; a new id was minted.
    ///
    /// `degraded` means the store could not be asked for the highest id and
    /// a time-derived id was used instead.
    Synthesized { degraded: bool },
}

/// Outcome of [`ProductIdentityCache::resolve_input`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub descriptor: ProductDescriptor,
    pub resolution: Resolution,
}

impl ResolvedProduct {
    fn new(descriptor: ProductDescriptor, resolution: Resolution) -> Self {
        Self {
            descriptor,
            resolution,
        }
    }

    pub fn into_descriptor(self) -> ProductDescriptor {
        self.descriptor
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The descriptor carries neither an id nor a name.
    #[error("invalid product input: {0}")]
    InvalidInput(String),
}
