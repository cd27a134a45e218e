use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{info, warn};

use mandi_core::{NormalizedName, ProductId};
use mandi_products::{CanonicalProduct, ProductDescriptor, UNKNOWN_CATEGORY};

use super::synthesis::IdSynthesizer;
use super::{
    CacheFreshness, CacheSource, IdentityCacheConfig, IdentityError, Resolution, ResolvedProduct,
};
use crate::store::{ProductStore, id_rank};

/// One cache generation. Replaced wholesale on every load.
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<NormalizedName, CanonicalProduct>,
    refreshed_at: Option<Instant>,
    source: Option<CacheSource>,
}

/// In-memory directory from normalized product name to canonical record.
///
/// ## Freshness
///
/// There is no background timer. Every lookup checks the age of the current
/// generation and reloads first when it is older than the freshness window.
/// A fallback load counts as fresh, so an unreachable store is asked at most
/// once per window.
///
/// ## Concurrency
///
/// Readers never observe a partially built generation: the replacement map is
/// built outside the lock and swapped in under a single write guard. Loads are
/// serialized by a refresh gate, and a lookup that finds the cache stale
/// re-checks after taking the gate, so a burst of stale lookups performs one
/// load. Single-entry mutations also take the gate and therefore apply on top
/// of an in-flight refresh instead of being overwritten by it.
pub struct ProductIdentityCache {
    store: Arc<dyn ProductStore>,
    config: IdentityCacheConfig,
    state: RwLock<CacheState>,
    refresh_gate: Mutex<()>,
    ids: IdSynthesizer,
}

impl ProductIdentityCache {
    pub fn new(store: Arc<dyn ProductStore>, config: IdentityCacheConfig) -> Self {
        Self {
            store,
            config,
            state: RwLock::new(CacheState::default()),
            refresh_gate: Mutex::new(()),
            ids: IdSynthesizer::default(),
        }
    }

    pub fn config(&self) -> &IdentityCacheConfig {
        &self.config
    }

    pub async fn state(&self) -> CacheFreshness {
        let state = self.state.read().await;
        self.freshness(&state)
    }

    /// Source of the current generation; `None` before the first load.
    pub async fn last_source(&self) -> Option<CacheSource> {
        self.state.read().await.source
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Reload everything from the store, or from the fallback catalog when
    /// the store cannot be reached. Never fails.
    pub async fn refresh(&self) -> CacheSource {
        let _gate = self.refresh_gate.lock().await;
        self.load().await
    }

    /// Look up a product by name (case- and whitespace-insensitive).
    pub async fn resolve_by_name(&self, name: &str) -> Option<CanonicalProduct> {
        self.ensure_fresh().await;
        let key = NormalizedName::new(name);
        self.state.read().await.entries.get(&key).cloned()
    }

    /// Up to `limit` products whose name contains `term` or is contained in it.
    ///
    /// Results are in cache iteration order, not ranked by relevance.
    pub async fn search(&self, term: &str, limit: usize) -> Vec<CanonicalProduct> {
        self.ensure_fresh().await;
        let term = NormalizedName::new(term);
        self.state
            .read()
            .await
            .entries
            .iter()
            .filter(|(name, _)| name.matches_bidirectional(&term))
            .map(|(_, product)| product.clone())
            .take(limit)
            .collect()
    }

    /// Snapshot of every entry, ordered by product id.
    pub async fn all_products(&self) -> Vec<CanonicalProduct> {
        self.ensure_fresh().await;
        let mut products: Vec<_> = self.state.read().await.entries.values().cloned().collect();
        products.sort_by(|a, b| id_rank(&a.product_id).cmp(&id_rank(&b.product_id)));
        products
    }

    /// Complete a partial product reference.
    ///
    /// - id and name: returned unchanged
    /// - id only: name and category filled from the entry with that id, or
    ///   returned unchanged when there is none
    /// - name only: id and category filled from the entry with that name
    ///   (the caller's name text is kept); otherwise a new id is minted, the
    ///   category defaults to `Unknown`, and the new record is added to the
    ///   current generation so the same name resolves to the same id until the
    ///   next reload
    /// - neither: [`IdentityError::InvalidInput`]
    pub async fn resolve_input(
        &self,
        descriptor: ProductDescriptor,
    ) -> Result<ResolvedProduct, IdentityError> {
        let id = descriptor.id().and_then(|s| s.parse::<ProductId>().ok());
        let name = descriptor.name().map(str::to_string);

        match (id, name) {
            (Some(_), Some(_)) => Ok(ResolvedProduct::new(descriptor, Resolution::Passthrough)),
            (Some(id), None) => {
                self.ensure_fresh().await;
                let found = self
                    .state
                    .read()
                    .await
                    .entries
                    .values()
                    .find(|p| p.product_id == id)
                    .cloned();
                Ok(match found {
                    Some(product) => ResolvedProduct::new(
                        descriptor.merge_name_from(&product),
                        Resolution::Matched,
                    ),
                    None => ResolvedProduct::new(descriptor, Resolution::Unmatched),
                })
            }
            (None, Some(name)) => match self.resolve_by_name(&name).await {
                Some(product) => Ok(ResolvedProduct::new(
                    descriptor.merge_id_from(&product),
                    Resolution::Matched,
                )),
                None => Ok(self.synthesize(descriptor, &name).await),
            },
            (None, None) => Err(IdentityError::InvalidInput(
                "either product_name or product_id must be provided".to_string(),
            )),
        }
    }

    /// Resolve a batch. Invalid descriptors are logged and skipped; the rest
    /// keep their input order.
    pub async fn resolve_inputs(&self, descriptors: Vec<ProductDescriptor>) -> Vec<ResolvedProduct> {
        let mut resolved = Vec::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            match self.resolve_input(descriptor).await {
                Ok(r) => resolved.push(r),
                Err(e) => warn!(index, error = %e, "skipping invalid product input"),
            }
        }
        resolved
    }

    /// Insert or replace the entry for `product`'s name without a reload.
    ///
    /// Returns the entry previously stored under that name.
    pub async fn add_entry(&self, product: CanonicalProduct) -> Option<CanonicalProduct> {
        let _gate = self.refresh_gate.lock().await;
        let key = product.normalized_name();
        self.state.write().await.entries.insert(key, product)
    }

    /// Drop the entry stored under `name`, returning it.
    pub async fn remove_entry(&self, name: &str) -> Option<CanonicalProduct> {
        let _gate = self.refresh_gate.lock().await;
        let key = NormalizedName::new(name);
        self.state.write().await.entries.remove(&key)
    }

    /// Mint an id for an unknown name and record it under that name.
    ///
    /// Runs under the refresh gate so two lookups of the same new name cannot
    /// both mint.
    async fn synthesize(&self, descriptor: ProductDescriptor, name: &str) -> ResolvedProduct {
        let _gate = self.refresh_gate.lock().await;
        let key = NormalizedName::new(name);

        let existing = self.state.read().await.entries.get(&key).cloned();
        if let Some(product) = existing {
            return ResolvedProduct::new(descriptor.merge_id_from(&product), Resolution::Matched);
        }

        let minted = self.ids.next_id(self.store.as_ref()).await;
        let descriptor = descriptor.assign_new_id(&minted.id);
        let record = CanonicalProduct::new(
            minted.id.as_str(),
            name.trim(),
            descriptor.category().unwrap_or(UNKNOWN_CATEGORY),
        );
        self.state.write().await.entries.insert(key, record);

        info!(product_name = %name, product_id = %minted.id, degraded = minted.degraded, "minted product id");
        ResolvedProduct::new(
            descriptor,
            Resolution::Synthesized {
                degraded: minted.degraded,
            },
        )
    }

    fn freshness(&self, state: &CacheState) -> CacheFreshness {
        match state.refreshed_at {
            None => CacheFreshness::Empty,
            Some(at) if at.elapsed() > self.config.freshness_window => CacheFreshness::Stale,
            Some(_) => CacheFreshness::Fresh,
        }
    }

    async fn ensure_fresh(&self) {
        if self.state().await == CacheFreshness::Fresh {
            return;
        }

        let _gate = self.refresh_gate.lock().await;
        // Another lookup may have reloaded while we waited for the gate.
        if self.state().await == CacheFreshness::Fresh {
            return;
        }
        self.load().await;
    }

    /// Caller must hold the refresh gate.
    async fn load(&self) -> CacheSource {
        let (entries, source) = match self.store.fetch_active_products().await {
            Ok(products) => (index(products), CacheSource::Store),
            Err(e) => {
                warn!(
                    error = %e,
                    fallback_entries = self.config.fallback.len(),
                    "product store unavailable; loading fallback catalog"
                );
                (index(self.config.fallback.iter().cloned()), CacheSource::Fallback)
            }
        };

        let count = entries.len();
        {
            let mut state = self.state.write().await;
            *state = CacheState {
                entries,
                refreshed_at: Some(Instant::now()),
                source: Some(source),
            };
        }
        info!(entries = count, source = ?source, "product cache refreshed");
        source
    }
}

impl std::fmt::Debug for ProductIdentityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductIdentityCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn index(products: impl IntoIterator<Item = CanonicalProduct>) -> HashMap<NormalizedName, CanonicalProduct> {
    products
        .into_iter()
        .map(|p| (p.normalized_name(), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::store::InMemoryProductStore;
    use mandi_products::fallback_catalog;

    fn seeded_store() -> Arc<InMemoryProductStore> {
        Arc::new(InMemoryProductStore::with_products([
            CanonicalProduct::new("P001", "Milk", "Dairy"),
            CanonicalProduct::new("P002", "Bread", "Bakery"),
            CanonicalProduct::new("P010", "Basmati Rice", "Grains"),
            CanonicalProduct::new("P011", "Brown Rice", "Grains"),
        ]))
    }

    fn cache_over(store: Arc<InMemoryProductStore>) -> ProductIdentityCache {
        ProductIdentityCache::new(store, IdentityCacheConfig::default())
    }

    #[tokio::test]
    async fn lookups_ignore_case_and_whitespace() {
        let cache = cache_over(seeded_store());

        let a = cache.resolve_by_name("Milk").await;
        let b = cache.resolve_by_name("  milk  ").await;
        let c = cache.resolve_by_name("MILK").await;

        assert_eq!(a, Some(CanonicalProduct::new("P001", "Milk", "Dairy")));
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[tokio::test]
    async fn first_lookup_loads_from_store() {
        let store = seeded_store();
        let cache = cache_over(store.clone());
        assert_eq!(cache.state().await, CacheFreshness::Empty);

        cache.resolve_by_name("bread").await;

        assert_eq!(cache.state().await, CacheFreshness::Fresh);
        assert_eq!(cache.last_source().await, Some(CacheSource::Store));
        assert_eq!(cache.len().await, 4);
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_store_serves_fallback_catalog_unchanged() {
        let store = Arc::new(InMemoryProductStore::unreachable());
        let cache = cache_over(store);

        assert_eq!(cache.refresh().await, CacheSource::Fallback);

        for expected in fallback_catalog() {
            let found = cache.resolve_by_name(&expected.product_name).await;
            assert_eq!(found.as_ref(), Some(&expected));
        }
        assert_eq!(cache.state().await, CacheFreshness::Fresh);
    }

    #[tokio::test]
    async fn bread_resolves_to_fallback_record() {
        let cache = cache_over(Arc::new(InMemoryProductStore::unreachable()));

        let resolved = cache
            .resolve_input(serde_json::from_value(json!({"product_name": "Bread"})).unwrap())
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Matched);
        assert_eq!(
            serde_json::to_value(&resolved.descriptor).unwrap(),
            json!({"product_id": "P002", "product_name": "Bread", "category": "Bakery"})
        );
    }

    #[tokio::test]
    async fn search_matches_in_both_directions() {
        let cache = cache_over(seeded_store());

        let mut short_query: Vec<_> = cache
            .search("rice", 10)
            .await
            .into_iter()
            .map(|p| p.product_id.into_inner())
            .collect();
        short_query.sort();
        assert_eq!(short_query, vec!["P010", "P011"]);

        let long_query = cache.search("Fresh Milk 1L", 10).await;
        assert_eq!(long_query.len(), 1);
        assert_eq!(long_query[0].product_id.as_str(), "P001");

        let padded = cache.search("  BROWN   rice pack ", 10).await;
        assert_eq!(padded.len(), 1);
        assert_eq!(padded[0].product_id.as_str(), "P011");

        assert!(cache.search("paneer", 10).await.is_empty());
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let cache = cache_over(seeded_store());
        assert_eq!(cache.search("rice", 1).await.len(), 1);
        assert!(cache.search("rice", 0).await.is_empty());
    }

    #[tokio::test]
    async fn all_products_is_sorted_by_id() {
        let cache = cache_over(Arc::new(InMemoryProductStore::unreachable()));
        let all = cache.all_products().await;
        assert_eq!(all.len(), 37);
        assert_eq!(all[0].product_id.as_str(), "P001");
        assert_eq!(all[36].product_id.as_str(), "P037");
    }

    #[tokio::test]
    async fn id_and_name_pass_through_unchanged() {
        let cache = cache_over(seeded_store());
        let input = ProductDescriptor::by_name("Whatever").with_id("X-9");

        let resolved = cache.resolve_input(input.clone()).await.unwrap();

        assert_eq!(resolved.resolution, Resolution::Passthrough);
        assert_eq!(resolved.descriptor, input);
    }

    #[tokio::test]
    async fn id_only_is_completed_from_cache() {
        let cache = cache_over(seeded_store());
        let input = ProductDescriptor::by_id("P002").with_extra("current_price", json!(42.5));

        let resolved = cache.resolve_input(input).await.unwrap();

        assert_eq!(resolved.resolution, Resolution::Matched);
        assert_eq!(resolved.descriptor.name(), Some("Bread"));
        assert_eq!(resolved.descriptor.category(), Some("Bakery"));
        assert_eq!(resolved.descriptor.extra["current_price"], json!(42.5));
    }

    #[tokio::test]
    async fn unknown_id_is_returned_unchanged() {
        let cache = cache_over(seeded_store());
        let input = ProductDescriptor::by_id("P404");

        let resolved = cache.resolve_input(input.clone()).await.unwrap();

        assert_eq!(resolved.resolution, Resolution::Unmatched);
        assert_eq!(resolved.descriptor, input);
    }

    #[tokio::test]
    async fn name_only_match_keeps_caller_text() {
        let cache = cache_over(seeded_store());

        let resolved = cache
            .resolve_input(ProductDescriptor::by_name("  BASMATI rice"))
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Matched);
        assert_eq!(resolved.descriptor.id(), Some("P010"));
        assert_eq!(resolved.descriptor.name(), Some("  BASMATI rice"));
        assert_eq!(resolved.descriptor.category(), Some("Grains"));
    }

    #[tokio::test]
    async fn unknown_name_gets_minted_id_and_unknown_category() {
        let cache = cache_over(seeded_store());

        let resolved = cache
            .resolve_input(ProductDescriptor::by_name("Tomato"))
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Synthesized { degraded: false });
        assert_eq!(resolved.descriptor.id(), Some("P012"));
        assert_eq!(resolved.descriptor.category(), Some(UNKNOWN_CATEGORY));
    }

    #[tokio::test]
    async fn repeated_unknown_name_reuses_minted_id() {
        let cache = cache_over(seeded_store());

        let resolved = cache
            .resolve_inputs(vec![
                ProductDescriptor::by_name("Tomato"),
                ProductDescriptor::by_name("  tomato "),
                ProductDescriptor::by_name("Onion"),
            ])
            .await;

        let ids: Vec<_> = resolved.iter().map(|r| r.descriptor.id().unwrap()).collect();
        assert_eq!(ids, vec!["P012", "P012", "P013"]);
        assert_eq!(resolved[1].resolution, Resolution::Matched);
        assert_eq!(resolved[1].descriptor.name(), Some("  tomato "));
        assert_eq!(resolved[1].descriptor.category(), Some(UNKNOWN_CATEGORY));
        assert_eq!(
            cache.resolve_by_name("TOMATO").await,
            Some(CanonicalProduct::new("P012", "Tomato", UNKNOWN_CATEGORY))
        );
    }

    #[tokio::test]
    async fn minted_entries_are_dropped_on_reload() {
        let store = seeded_store();
        let cache = cache_over(store.clone());

        cache
            .resolve_input(ProductDescriptor::by_name("Tomato"))
            .await
            .unwrap();
        cache.refresh().await;

        assert!(cache.resolve_by_name("tomato").await.is_none());
        assert_eq!(cache.len().await, 4);
        // The high-water mark survives the reload.
        let again = cache
            .resolve_input(ProductDescriptor::by_name("Tomato"))
            .await
            .unwrap();
        assert_eq!(again.descriptor.id(), Some("P013"));
    }

    #[tokio::test]
    async fn legacy_store_ids_do_not_cause_collisions() {
        let cache = cache_over(Arc::new(InMemoryProductStore::with_products([
            CanonicalProduct::new("P001", "Milk", "Dairy"),
            CanonicalProduct::new("P006", "Eggs", "Dairy"),
            CanonicalProduct::new("P037", "Chocolate Bar", "Snacks"),
            CanonicalProduct::new("SKU-0005", "Jaggery", "Sweeteners"),
        ])));

        let resolved = cache
            .resolve_input(ProductDescriptor::by_name("Tomato"))
            .await
            .unwrap();

        assert_eq!(resolved.descriptor.id(), Some("P038"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_of_one_new_name_share_an_id() {
        let cache = Arc::new(cache_over(seeded_store()));

        let lookups: Vec<_> = ["Tomato", "tomato", " TOMATO", "Tomato "]
            .into_iter()
            .map(|name| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .resolve_input(ProductDescriptor::by_name(name))
                        .await
                        .unwrap()
                        .descriptor
                        .product_id
                        .unwrap()
                })
            })
            .collect();

        for lookup in lookups {
            assert_eq!(lookup.await.unwrap(), "P012");
        }
    }

    #[tokio::test]
    async fn minted_category_keeps_caller_value() {
        let cache = cache_over(seeded_store());

        let resolved = cache
            .resolve_input(ProductDescriptor::by_name("Tomato").with_category("Produce"))
            .await
            .unwrap();

        assert_eq!(resolved.descriptor.category(), Some("Produce"));
    }

    #[tokio::test]
    async fn unknown_name_with_unreachable_store_is_degraded() {
        let cache = cache_over(Arc::new(InMemoryProductStore::unreachable()));

        let resolved = cache
            .resolve_input(ProductDescriptor::by_name("Dragon Fruit"))
            .await
            .unwrap();

        assert_eq!(resolved.resolution, Resolution::Synthesized { degraded: true });
        let id = resolved.descriptor.id().unwrap();
        assert!(id.starts_with('P') && id.len() > 1);
        assert_eq!(resolved.descriptor.category(), Some(UNKNOWN_CATEGORY));
    }

    #[tokio::test]
    async fn empty_descriptor_is_invalid_input() {
        let cache = cache_over(seeded_store());

        let blank = ProductDescriptor::default().with_name("   ").with_category("Dairy");
        let err = cache.resolve_input(blank).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidInput(_)));

        let err = cache
            .resolve_input(ProductDescriptor::default())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn batch_skips_invalid_and_keeps_order() {
        let cache = cache_over(seeded_store());

        let resolved = cache
            .resolve_inputs(vec![
                ProductDescriptor::by_name("bread"),
                ProductDescriptor::default(),
                ProductDescriptor::by_id("P001"),
            ])
            .await;

        let ids: Vec<_> = resolved.iter().map(|r| r.descriptor.id().unwrap()).collect();
        assert_eq!(ids, vec!["P002", "P001"]);
    }

    #[tokio::test]
    async fn add_and_remove_entry_without_reload() {
        let store = seeded_store();
        let cache = cache_over(store.clone());
        cache.refresh().await;

        let previous = cache
            .add_entry(CanonicalProduct::new("P050", "Paneer", "Dairy"))
            .await;
        assert!(previous.is_none());
        assert_eq!(
            cache.resolve_by_name("paneer").await.map(|p| p.product_id.into_inner()),
            Some("P050".to_string())
        );

        let removed = cache.remove_entry("  MILK ").await;
        assert_eq!(removed.map(|p| p.product_name), Some("Milk".to_string()));
        assert!(cache.resolve_by_name("milk").await.is_none());
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn refresh_replaces_all_entries() {
        let store = seeded_store();
        let cache = cache_over(store.clone());
        cache.refresh().await;
        cache
            .add_entry(CanonicalProduct::new("P050", "Paneer", "Dairy"))
            .await;

        store.set_active(&mandi_core::ProductId::new("P001"), false);
        cache.refresh().await;

        assert!(cache.resolve_by_name("paneer").await.is_none());
        assert!(cache.resolve_by_name("milk").await.is_none());
        assert_eq!(cache.len().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn reloads_only_after_freshness_window() {
        let store = seeded_store();
        let cache = ProductIdentityCache::new(
            store.clone(),
            IdentityCacheConfig::default().with_freshness_window(Duration::from_secs(300)),
        );

        cache.resolve_by_name("milk").await;
        assert_eq!(store.load_count(), 1);

        tokio::time::advance(Duration::from_secs(299)).await;
        cache.resolve_by_name("milk").await;
        assert_eq!(cache.state().await, CacheFreshness::Fresh);
        assert_eq!(store.load_count(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.state().await, CacheFreshness::Stale);
        cache.resolve_by_name("milk").await;
        assert_eq!(cache.state().await, CacheFreshness::Fresh);
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_load_is_not_retried_within_window() {
        let store = Arc::new(InMemoryProductStore::unreachable());
        let cache = cache_over(store.clone());

        cache.resolve_by_name("milk").await;
        store.set_reachable(true);
        store.insert(CanonicalProduct::new("P001", "Milk", "Dairy"));

        tokio::time::advance(Duration::from_secs(60)).await;
        cache.resolve_by_name("milk").await;
        assert_eq!(cache.last_source().await, Some(CacheSource::Fallback));

        tokio::time::advance(Duration::from_secs(300)).await;
        cache.resolve_by_name("milk").await;
        assert_eq!(cache.last_source().await, Some(CacheSource::Store));
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_stale_lookups_share_one_load() {
        let store = Arc::new(
            InMemoryProductStore::with_products([CanonicalProduct::new("P001", "Milk", "Dairy")])
                .with_latency(Duration::from_millis(50)),
        );
        let cache = Arc::new(cache_over(store.clone()));

        let lookups: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.resolve_by_name("milk").await })
            })
            .collect();
        for lookup in lookups {
            assert!(lookup.await.unwrap().is_some());
        }

        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn readers_never_see_an_empty_generation() {
        let store = Arc::new(
            InMemoryProductStore::with_products([
                CanonicalProduct::new("P001", "Milk", "Dairy"),
                CanonicalProduct::new("P002", "Bread", "Bakery"),
            ])
            .with_latency(Duration::from_millis(1)),
        );
        let cache = Arc::new(cache_over(store));
        cache.refresh().await;

        let refresher = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    cache.refresh().await;
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        assert!(cache.resolve_by_name("milk").await.is_some());
                        assert_eq!(cache.len().await, 2);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        refresher.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }

    #[tokio::test]
    async fn concurrent_mints_are_distinct() {
        let cache = Arc::new(cache_over(seeded_store()));

        let mints: Vec<_> = ["Tomato", "Onion", "Potato", "Garlic"]
            .into_iter()
            .map(|name| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache
                        .resolve_input(ProductDescriptor::by_name(name))
                        .await
                        .unwrap()
                        .descriptor
                        .product_id
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for mint in mints {
            ids.push(mint.await.unwrap());
        }
        ids.sort();
        assert_eq!(ids, vec!["P012", "P013", "P014", "P015"]);
    }
}
