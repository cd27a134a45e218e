use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use mandi_bridge::BridgeError;
use mandi_infra::{ForecastError, IdentityError};

pub fn forecast_error_to_response(err: ForecastError) -> axum::response::Response {
    match err {
        ForecastError::NoProducts => json_error(
            StatusCode::BAD_REQUEST,
            "no_products",
            "products must contain at least one product with a name or id",
        ),
        ForecastError::Bridge(e) => bridge_error_to_response(e),
        ForecastError::Engine(msg) => json_error(StatusCode::BAD_GATEWAY, "model_error", msg),
        ForecastError::Decode(e) => {
            json_error(StatusCode::BAD_GATEWAY, "model_reply_invalid", e.to_string())
        }
    }
}

pub fn bridge_error_to_response(err: BridgeError) -> axum::response::Response {
    warn!(kind = err.kind(), error = %err, stderr = err.stderr().unwrap_or(""), "model invocation failed");
    let status = match &err {
        BridgeError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::StartFailure { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    json_error(status, err.kind(), err.to_string())
}

pub fn identity_error_to_response(err: IdentityError) -> axum::response::Response {
    match err {
        IdentityError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
