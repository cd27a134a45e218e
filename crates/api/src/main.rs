use std::sync::Arc;

use anyhow::Context;

use mandi_api::app::{AppServices, build_app};
use mandi_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    mandi_observability::init(config.log_format);

    let services = AppServices::from_config(&config)
        .await
        .context("failed to set up product store")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
