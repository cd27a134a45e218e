use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use mandi_products::ProductDescriptor;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_SEARCH_LIMIT: usize = 10;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/search/:term", get(search_products))
        .route("/by-name/:name", get(get_by_name))
        .route("/map", post(map_product))
        .route("/map/batch", post(map_products))
        .route("/cache", get(cache_status))
        .route("/cache/refresh", post(refresh_cache))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let data = services.cache.all_products().await;
    Json(dto::ProductListResponse {
        success: true,
        total: data.len(),
        data,
    })
    .into_response()
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Path(term): Path<String>,
    Query(query): Query<dto::SearchQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let data = services.cache.search(&term, limit).await;
    Json(dto::SearchResponse {
        success: true,
        total_results: data.len(),
        search_term: term,
        data,
    })
    .into_response()
}

pub async fn get_by_name(
    Extension(services): Extension<Arc<AppServices>>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match services.cache.resolve_by_name(&name).await {
        Some(product) => Json(dto::ProductResponse {
            success: true,
            data: product,
        })
        .into_response(),
        None => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("product `{name}` not found"),
        ),
    }
}

pub async fn map_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ProductDescriptor>,
) -> axum::response::Response {
    match services.cache.resolve_input(body).await {
        Ok(resolved) => Json(dto::MapResponse {
            success: true,
            data: resolved.descriptor,
            resolution: resolved.resolution,
        })
        .into_response(),
        Err(e) => errors::identity_error_to_response(e),
    }
}

pub async fn map_products(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::MapBatchRequest>,
) -> axum::response::Response {
    if body.products.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "products must be a non-empty array",
        );
    }

    let data: Vec<_> = services
        .cache
        .resolve_inputs(body.products)
        .await
        .into_iter()
        .map(|r| r.descriptor)
        .collect();
    Json(dto::MapBatchResponse {
        success: true,
        total_mapped: data.len(),
        data,
    })
    .into_response()
}

pub async fn cache_status(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    Json(dto::CacheStatusResponse {
        success: true,
        state: services.cache.state().await,
        source: services.cache.last_source().await,
        entries: services.cache.len().await,
    })
    .into_response()
}

pub async fn refresh_cache(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let source = services.cache.refresh().await;
    Json(dto::CacheRefreshResponse {
        success: true,
        source,
        entries: services.cache.len().await,
    })
    .into_response()
}
