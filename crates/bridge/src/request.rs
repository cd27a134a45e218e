use serde::{Deserialize, Serialize};

use mandi_products::ProductDescriptor;

/// Operation name for demand forecasting.
pub const OP_PREDICT_DEMAND: &str = "predict_demand";

/// Operation name for price recommendations.
pub const OP_PREDICT_PRICING: &str = "predict_pricing";

/// A typed request for one engine operation.
///
/// The bridge serializes the request as-is; it never inspects the fields.
pub trait ModelRequest: Serialize + Send + Sync {
    /// Positional operation argument passed to the engine.
    fn operation(&self) -> &'static str;
}

/// Inputs to `predict_demand`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecastRequest {
    pub products: Vec<ProductDescriptor>,

    /// Number of days to forecast.
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
}

impl DemandForecastRequest {
    pub fn new(products: Vec<ProductDescriptor>) -> Self {
        Self {
            products,
            forecast_days: default_forecast_days(),
            cities: default_cities(),
        }
    }

    pub fn with_forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = days;
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }
}

impl ModelRequest for DemandForecastRequest {
    fn operation(&self) -> &'static str {
        OP_PREDICT_DEMAND
    }
}

/// Inputs to `predict_pricing`.
///
/// Price-relevant attributes (`current_price`, `stock_level`, `days_left`,
/// `demand_score`, ...) travel in each descriptor's extra fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub products: Vec<ProductDescriptor>,
}

impl PricingRequest {
    pub fn new(products: Vec<ProductDescriptor>) -> Self {
        Self { products }
    }
}

impl ModelRequest for PricingRequest {
    fn operation(&self) -> &'static str {
        OP_PREDICT_PRICING
    }
}

fn default_forecast_days() -> u32 {
    7
}

fn default_cities() -> Vec<String> {
    ["Mumbai", "Delhi", "Bangalore", "Chennai", "Pune"]
        .into_iter()
        .map(String::from)
        .collect()
}
