//! Product-store read contract and its adapters.
//!
//! The identity cache only ever reads: "all active products" and "the highest
//! identifier ever assigned". Both are eventually consistent from the cache's
//! point of view.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use mandi_core::ProductId;
use mandi_products::CanonicalProduct;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

/// Read-only view of the product system of record.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products currently marked active.
    async fn fetch_active_products(&self) -> Result<Vec<CanonicalProduct>, StoreError>;

    /// Highest minting-sequence identifier (`P` + digits) in the store, active
    /// or not. Identifiers in any other format are ignored. `None` when there
    /// are none.
    async fn fetch_highest_product_id(&self) -> Result<Option<ProductId>, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn fetch_active_products(&self) -> Result<Vec<CanonicalProduct>, StoreError> {
        (**self).fetch_active_products().await
    }

    async fn fetch_highest_product_id(&self) -> Result<Option<ProductId>, StoreError> {
        (**self).fetch_highest_product_id().await
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("product store unreachable: {0}")]
    Unreachable(String),

    #[error("product store query failed: {0}")]
    Query(String),
}

/// Display ordering for product ids: longer ids sort after shorter ones, so
/// `P1000` follows `P999`.
pub(crate) fn id_rank(id: &ProductId) -> (usize, &str) {
    (id.as_str().len(), id.as_str())
}

/// Ordering used for "highest identifier" among sequenced ids: by numeric
/// value, so `P1000` outranks `P999` and `P0040` outranks `P037`.
pub(crate) fn sequence_rank(id: &ProductId) -> (u64, usize) {
    (id.numeric_part(), id.as_str().len())
}
