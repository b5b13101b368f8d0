//! Plain HTTP endpoints for probes and scraping.
//!
//! - `GET /status`  returns `200 OK` while the server is serving, `503` otherwise
//! - `GET /metrics` returns Prometheus text exposition

mod handlers;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::health::HealthRegistry;
use crate::metrics::EvaluationMetrics;

#[derive(Clone)]
pub(crate) struct StatusState {
    pub(crate) health: Arc<HealthRegistry>,
    pub(crate) metrics: Arc<EvaluationMetrics>,
}

/// Build the status router.
#[must_use]
pub fn status_router(health: Arc<HealthRegistry>, metrics: Arc<EvaluationMetrics>) -> Router {
    Router::new()
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .layer(
            TraceLayer::new_for_http().make_span_with(
                |req: &axum::http::Request<axum::body::Body>| {
                    tracing::debug_span!(
                        "status_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                    )
                },
            ),
        )
        .with_state(StatusState { health, metrics })
}
