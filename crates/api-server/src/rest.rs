//! REST handlers for the bid endpoint and operational endpoints.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use openbidder_agents::BidProcessor;
use openbidder_core::openrtb::BidRequest;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<BidProcessor>,
    pub start_time: Instant,
}

/// Build the router for the bid port.
pub fn bid_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_bid))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Build the router for the win or event notification port. The exchange
/// posts to arbitrary paths, so everything lands in one handler.
pub fn notification_router(kind: &'static str) -> Router {
    Router::new().fallback(move || handle_notification(kind))
}

/// POST / on the bid port. A body that does not parse as a bid request is
/// answered with 204 no-bid, never a protocol error; the exchange only
/// ever sees a valid response or "no content".
pub async fn handle_bid(State(state): State<AppState>, body: Bytes) -> Response {
    let start = Instant::now();

    let request: BidRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unparseable bid request, responding no-bid");
            metrics::counter!("bids.unparseable_requests").increment(1);
            return StatusCode::NO_CONTENT.into_response();
        }
    };

    info!(request_id = %request.id, imps = request.imp.len(), "Received bid request");

    let result = state.processor.process(&request);

    metrics::histogram!("bids.request_latency_us").record(start.elapsed().as_micros() as f64);

    match result {
        Some(response) => {
            let mut http_response = Json(response).into_response();
            http_response
                .headers_mut()
                .insert("x-openrtb-version", HeaderValue::from_static("2.1"));
            http_response
        }
        None => {
            info!(request_id = %request.id, "No bid");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Win and event notifications are acknowledged and logged, nothing more.
async fn handle_notification(kind: &'static str) -> StatusCode {
    info!(kind, "Notification received");
    metrics::counter!("notifications.received", "kind" => kind).increment(1);
    StatusCode::OK
}

/// GET /health on the bid port.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        agents: state.processor.registry().len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub agents: usize,
    pub uptime_secs: u64,
}
