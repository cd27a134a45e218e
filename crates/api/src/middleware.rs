use axum::{http::Request, middleware::Next, response::Response};
use tokio::time::Instant;
use tracing::{Instrument, info, info_span};

/// One span per request; logs method, path, status and latency on completion.
pub async fn trace_requests(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("http.request", %method, %path);

    async move {
        let started = Instant::now();
        let response = next.run(req).await;
        info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}
