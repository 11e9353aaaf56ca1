//! API server: bid listener, win/event listeners, metrics exporter.

use crate::rest::{self, AppState};
use openbidder_agents::BidProcessor;
use openbidder_core::config::AppConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Serves the bidder's three listeners: bid, win, and event.
pub struct ApiServer {
    config: AppConfig,
    processor: Arc<BidProcessor>,
}

impl ApiServer {
    pub fn new(config: AppConfig, processor: Arc<BidProcessor>) -> Self {
        Self { config, processor }
    }

    /// Start all HTTP listeners. The win and event listeners run as
    /// background tasks; the bid listener runs here until `shutdown`
    /// resolves.
    pub async fn start_http(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let host: std::net::IpAddr = self.config.api.host.parse()?;

        // Win/event notification listeners. No-ops beyond logging.
        for (kind, port) in [
            ("win", self.config.api.win_port),
            ("event", self.config.api.event_port),
        ] {
            let addr = SocketAddr::new(host, port);
            let app = rest::notification_router(kind).layer(TraceLayer::new_for_http());
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(addr = %addr, kind, "Notification listener started");
            tokio::spawn(async move {
                let _ = axum::serve(listener, app).await;
            });
        }

        let state = AppState {
            processor: self.processor.clone(),
            start_time: Instant::now(),
        };

        let app = rest::bid_router(state)
            .layer(CompressionLayer::new())
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http());

        let addr = SocketAddr::new(host, self.config.api.bid_port);
        info!(addr = %addr, "Bid listener started");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }

    /// Start the Prometheus exporter on its own port. Must be called from
    /// within the runtime; the exporter spawns its listener there.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}
