use serde::{Deserialize, Serialize};

use mandi_bridge::{DemandForecast, PricingRecommendations};
use mandi_infra::{CacheFreshness, CacheSource, Resolution};
use mandi_products::{CanonicalProduct, ProductDescriptor};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MapBatchRequest {
    #[serde(default)]
    pub products: Vec<ProductDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct DemandPredictRequest {
    #[serde(default)]
    pub products: Vec<ProductDescriptor>,
    pub forecast_days: Option<u32>,
    pub cities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PricingPredictRequest {
    #[serde(default)]
    pub products: Vec<ProductDescriptor>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub data: Vec<CanonicalProduct>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub data: Vec<CanonicalProduct>,
    pub search_term: String,
    pub total_results: usize,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub data: CanonicalProduct,
}

#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub success: bool,
    pub data: ProductDescriptor,
    pub resolution: Resolution,
}

#[derive(Debug, Serialize)]
pub struct MapBatchResponse {
    pub success: bool,
    pub data: Vec<ProductDescriptor>,
    pub total_mapped: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheStatusResponse {
    pub success: bool,
    pub state: CacheFreshness,
    pub source: Option<CacheSource>,
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheRefreshResponse {
    pub success: bool,
    pub source: CacheSource,
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct DemandPredictResponse {
    pub success: bool,
    pub data: DemandForecast,
}

#[derive(Debug, Serialize)]
pub struct PricingPredictResponse {
    pub success: bool,
    pub data: PricingRecommendations,
}
