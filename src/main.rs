//! Cloudburst API Server
//!
//! Run with: cargo run --bin cloudburst
//!
//! # Configuration
//!
//! Read from the first existing `config.toml` (see `cloudburst-cli config`),
//! then overridden by environment variables:
//! - `CLOUDBURST_REPORT_URL`: Report storage service
//! - `CLOUDBURST_API_HOST` / `CLOUDBURST_API_PORT`: Bind address (default: 0.0.0.0:8090)
//! - `CLOUDBURST_TOP_N`, `CLOUDBURST_MINUTES_PER_VISIT`, `CLOUDBURST_TIMEZONE`: Aggregation
//! - `CLOUDBURST_LOG_LEVEL` / `CLOUDBURST_LOG_FORMAT`: Logging (`RUST_LOG` wins when set)

use cloudburst::api::{serve, AppState};
use cloudburst::config::{Config, LoggingConfig};
use cloudburst::report::ReportClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Cloudburst API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Report service: {}", config.report.base_url);

    let client = ReportClient::new(config.report.client_config())?;
    let categories = config.aggregation.category_table();
    tracing::info!(
        categories = categories.rules().len(),
        top_n = config.aggregation.top_n,
        minutes_per_visit = config.aggregation.minutes_per_visit,
        "Aggregation configured"
    );

    let state = AppState::new(
        Arc::new(client),
        categories,
        config.aggregation.options(),
        config.api.clone(),
    );

    serve(state, &config.api).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("cloudburst={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
