//! `mandi-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! product identifiers, normalized product names, and the domain error model.

pub mod error;
pub mod id;
pub mod value_object;

pub use error::DomainError;
pub use id::ProductId;
pub use value_object::{NormalizedName, ValueObject};
