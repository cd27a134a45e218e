//! Products domain module.
//!
//! Canonical product records, the partial references callers supply, and the
//! static catalog served when the system of record is unreachable. Pure data
//! and rules only (no IO, no HTTP, no storage).

pub mod fallback;
pub mod product;

pub use fallback::fallback_catalog;
pub use product::{CanonicalProduct, ProductDescriptor, UNKNOWN_CATEGORY};
