use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use mandi_core::ProductId;
use mandi_products::CanonicalProduct;

use super::{ProductStore, StoreError, sequence_rank};

#[derive(Debug, Clone)]
struct StoredProduct {
    product: CanonicalProduct,
    active: bool,
}

/// In-memory product store for tests/dev.
///
/// Can be switched unreachable to simulate an outage, and counts how many
/// times the active set was loaded.
#[derive(Debug)]
pub struct InMemoryProductStore {
    inner: RwLock<Vec<StoredProduct>>,
    reachable: AtomicBool,
    loads: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
            reachable: AtomicBool::new(true),
            loads: AtomicUsize::new(0),
            latency: None,
        }
    }

    pub fn with_products(products: impl IntoIterator<Item = CanonicalProduct>) -> Self {
        let store = Self::new();
        for p in products {
            store.insert(p);
        }
        store
    }

    /// A store that fails every call, e.g. when no database is configured.
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.set_reachable(false);
        store
    }

    /// Delay every call by `latency` (lets tests overlap concurrent loads).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert or replace (by id) an active product.
    pub fn insert(&self, product: CanonicalProduct) {
        self.upsert(product, true);
    }

    pub fn insert_inactive(&self, product: CanonicalProduct) {
        self.upsert(product, false);
    }

    pub fn set_active(&self, id: &ProductId, active: bool) {
        if let Ok(mut rows) = self.inner.write() {
            for row in rows.iter_mut().filter(|r| &r.product.product_id == id) {
                row.active = active;
            }
        }
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of `fetch_active_products` calls that reached the data.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    fn upsert(&self, product: CanonicalProduct, active: bool) {
        if let Ok(mut rows) = self.inner.write() {
            match rows
                .iter_mut()
                .find(|r| r.product.product_id == product.product_id)
            {
                Some(row) => {
                    row.product = product;
                    row.active = active;
                }
                None => rows.push(StoredProduct { product, active }),
            }
        }
    }

    async fn check(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unreachable("in-memory store switched off".to_string()))
        }
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn fetch_active_products(&self) -> Result<Vec<CanonicalProduct>, StoreError> {
        self.check().await?;
        self.loads.fetch_add(1, Ordering::SeqCst);

        let rows = self
            .inner
            .read()
            .map_err(|_| StoreError::Query("product table lock poisoned".to_string()))?;
        Ok(rows
            .iter()
            .filter(|r| r.active)
            .map(|r| r.product.clone())
            .collect())
    }

    async fn fetch_highest_product_id(&self) -> Result<Option<ProductId>, StoreError> {
        self.check().await?;

        let rows = self
            .inner
            .read()
            .map_err(|_| StoreError::Query("product table lock poisoned".to_string()))?;
        Ok(rows
            .iter()
            .map(|r| &r.product.product_id)
            .filter(|id| id.is_sequenced())
            .max_by_key(|id| sequence_rank(id))
            .cloned())
    }
}
