//! Infrastructure layer: product store adapters, identity cache, config,
//! and the forecasting service that composes the cache with the model bridge.

pub mod config;
pub mod forecasting;
pub mod identity;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use forecasting::{ForecastError, ForecastService};
pub use identity::{
    CacheFreshness, CacheSource, IdentityCacheConfig, IdentityError, ProductIdentityCache,
    Resolution, ResolvedProduct,
};
pub use store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
