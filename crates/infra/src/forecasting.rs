//! Forecasting service: resolve product references, then ask the model.
//!
//! The identity cache and the bridge share no state; this service is the only
//! place they meet.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use mandi_bridge::{
    BridgeError, BridgeResult, DemandForecast, DemandForecastRequest, ModelRequest,
    PricingRecommendations, PricingRequest, ProcessBridge,
};
use mandi_products::ProductDescriptor;

use crate::identity::{ProductIdentityCache, ResolvedProduct};

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("no valid products in request")]
    NoProducts,

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The engine ran and answered `success: false`.
    #[error("model reported failure: {0}")]
    Engine(String),

    /// The engine answered `success: true` with an unexpected payload shape.
    #[error("unexpected model reply: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Clone)]
pub struct ForecastService {
    cache: Arc<ProductIdentityCache>,
    bridge: Arc<ProcessBridge>,
}

impl ForecastService {
    pub fn new(cache: Arc<ProductIdentityCache>, bridge: Arc<ProcessBridge>) -> Self {
        Self { cache, bridge }
    }

    pub fn cache(&self) -> &Arc<ProductIdentityCache> {
        &self.cache
    }

    pub fn bridge(&self) -> &Arc<ProcessBridge> {
        &self.bridge
    }

    /// Demand forecast for `products`. `None` parameters take the request defaults.
    pub async fn forecast_demand(
        &self,
        products: Vec<ProductDescriptor>,
        forecast_days: Option<u32>,
        cities: Option<Vec<String>>,
    ) -> Result<DemandForecast, ForecastError> {
        let mut request = DemandForecastRequest::new(self.resolve(products).await?);
        if let Some(days) = forecast_days {
            request = request.with_forecast_days(days);
        }
        if let Some(cities) = cities {
            request = request.with_cities(cities);
        }

        let reply = self.call(&request).await?;
        let forecast: DemandForecast = reply.into_typed().map_err(ForecastError::Decode)?;
        info!(predictions = forecast.total_predictions, "demand forecast ready");
        Ok(forecast)
    }

    /// Price recommendations for `products`.
    pub async fn recommend_prices(
        &self,
        products: Vec<ProductDescriptor>,
    ) -> Result<PricingRecommendations, ForecastError> {
        let request = PricingRequest::new(self.resolve(products).await?);

        let reply = self.call(&request).await?;
        let recommendations: PricingRecommendations =
            reply.into_typed().map_err(ForecastError::Decode)?;
        info!(
            recommendations = recommendations.total_recommendations,
            "price recommendations ready"
        );
        Ok(recommendations)
    }

    async fn resolve(
        &self,
        products: Vec<ProductDescriptor>,
    ) -> Result<Vec<ProductDescriptor>, ForecastError> {
        let resolved: Vec<_> = self
            .cache
            .resolve_inputs(products)
            .await
            .into_iter()
            .map(ResolvedProduct::into_descriptor)
            .collect();
        if resolved.is_empty() {
            return Err(ForecastError::NoProducts);
        }
        Ok(resolved)
    }

    async fn call<R: ModelRequest>(&self, request: &R) -> Result<BridgeResult, ForecastError> {
        let reply = self.bridge.invoke(request, None).await?;
        if !reply.success {
            let message = reply
                .error_message()
                .unwrap_or("model reported failure without a message")
                .to_string();
            warn!(operation = request.operation(), %message, "model reported failure");
            return Err(ForecastError::Engine(message));
        }
        Ok(reply)
    }
}

impl std::fmt::Debug for ForecastService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastService")
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
