use axum::{Router, routing::post};

pub mod predictions;
pub mod products;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .route("/demand/predict", post(predictions::predict_demand))
        .route("/pricing/predict", post(predictions::predict_pricing))
}
