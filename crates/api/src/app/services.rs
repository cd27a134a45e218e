use std::sync::Arc;

use tracing::{info, warn};

use mandi_bridge::ProcessBridge;
use mandi_infra::{
    AppConfig, ForecastService, InMemoryProductStore, PostgresProductStore, ProductIdentityCache,
    ProductStore, StoreError,
};

/// Long-lived services shared by every handler.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub cache: Arc<ProductIdentityCache>,
    pub forecasting: ForecastService,
}

impl AppServices {
    pub fn new(cache: Arc<ProductIdentityCache>, bridge: Arc<ProcessBridge>) -> Self {
        let forecasting = ForecastService::new(cache.clone(), bridge);
        Self { cache, forecasting }
    }

    /// Wire services from configuration.
    ///
    /// Without `DATABASE_URL` the cache runs on a store that is always
    /// unreachable, so it serves the fallback catalog.
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn ProductStore> = match &config.database_url {
            Some(url) => {
                let store = PostgresProductStore::connect_lazy(url)?;
                if let Err(e) = store.ensure_schema().await {
                    warn!(error = %e, "could not verify products table; lookups may fall back");
                }
                Arc::new(store)
            }
            None => {
                warn!("DATABASE_URL not set; serving the fallback product catalog");
                Arc::new(InMemoryProductStore::unreachable())
            }
        };

        let cache = Arc::new(ProductIdentityCache::new(store, config.cache.clone()));
        let bridge = Arc::new(ProcessBridge::new(config.bridge.clone()));
        info!(
            model = %config.bridge.program(),
            script = %config.bridge.script,
            timeout_secs = config.bridge.default_timeout.as_secs(),
            "model bridge configured"
        );

        Ok(Self::new(cache, bridge))
    }
}
