//! FunnelBoard — marketing funnel analytics engine with a REST surface.
//!
//! Loads the lead dataset once, normalizes it into an immutable snapshot,
//! and serves the funnel query surfaces to any rendering front-end.

use std::sync::Arc;

use clap::Parser;
use funnel_api::{AnalysisSession, ApiServer};
use funnel_core::AppConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "funnelboard")]
#[command(about = "Marketing funnel analytics engine")]
#[command(version)]
struct Cli {
    /// Lead dataset CSV path (overrides config)
    #[arg(long, env = "FUNNELBOARD__DATASET__PATH")]
    dataset: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "FUNNELBOARD__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Metrics port (overrides config)
    #[arg(long, env = "FUNNELBOARD__METRICS__PORT")]
    metrics_port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnelboard=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(dataset) = cli.dataset {
        config.dataset.path = dataset;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(port) = cli.metrics_port {
        config.metrics.port = port;
    }

    info!(
        dataset = %config.dataset.path,
        http_port = config.api.http_port,
        metrics_port = config.metrics.port,
        "FunnelBoard starting up"
    );

    let session = Arc::new(AnalysisSession::open(&config.dataset.path)?);
    let table = session.table();
    info!(
        rows = table.len(),
        generation = table.generation(),
        "Lead dataset ready"
    );

    let server = ApiServer::new(config, session);
    server.start_metrics().await?;
    server.start_http().await?;

    Ok(())
}
