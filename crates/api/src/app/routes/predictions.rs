use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::IntoResponse,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn predict_demand(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::DemandPredictRequest>,
) -> axum::response::Response {
    match services
        .forecasting
        .forecast_demand(body.products, body.forecast_days, body.cities)
        .await
    {
        Ok(data) => Json(dto::DemandPredictResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}

pub async fn predict_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PricingPredictRequest>,
) -> axum::response::Response {
    match services.forecasting.recommend_prices(body.products).await {
        Ok(data) => Json(dto::PricingPredictResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}
