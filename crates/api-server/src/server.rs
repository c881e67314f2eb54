//! HTTP server wiring — routes, middleware, and the metrics exporter.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use funnel_core::AppConfig;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::rest::{self, AppState};
use crate::state::AnalysisSession;

pub struct ApiServer {
    config: AppConfig,
    session: Arc<AnalysisSession>,
}

impl ApiServer {
    pub fn new(config: AppConfig, session: Arc<AnalysisSession>) -> Self {
        Self { config, session }
    }

    pub fn router(session: Arc<AnalysisSession>) -> Router {
        let state = AppState {
            session,
            start_time: Instant::now(),
        };

        Router::new()
            // Funnel query surfaces
            .route("/v1/funnel/overview", get(rest::funnel_overview))
            .route("/v1/funnel/breakdown", get(rest::funnel_breakdown))
            .route("/v1/funnel/pivot", get(rest::funnel_pivot))
            .route("/v1/funnel/drilldown", post(rest::funnel_drilldown))
            // Segment scoring surfaces
            .route("/v1/segments/ranking", get(rest::segment_ranking))
            .route("/v1/segments/profile", post(rest::segment_profile))
            // Dataset management
            .route("/v1/dataset/quality", get(rest::dataset_quality))
            .route("/v1/dataset/reload", post(rest::dataset_reload))
            // Operational endpoints
            .route("/health", get(rest::health_check))
            .route("/ready", get(rest::readiness))
            .route("/live", get(rest::liveness))
            // Middleware
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the HTTP server and serve until shutdown.
    pub async fn start_http(&self) -> anyhow::Result<()> {
        let app = Self::router(self.session.clone());

        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);
        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Start the Prometheus metrics exporter on its own port.
    pub async fn start_metrics(&self) -> anyhow::Result<()> {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        let handle = builder
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install_recorder()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");

        // Keep the recorder alive for the process lifetime
        std::mem::forget(handle);
        Ok(())
    }
}
