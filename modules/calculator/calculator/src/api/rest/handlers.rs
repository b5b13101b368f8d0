use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::StatusState;
use crate::health::ServingStatus;

pub(super) async fn status(State(state): State<StatusState>) -> Response {
    match state.health.overall() {
        Some(ServingStatus::Serving) => (StatusCode::OK, "OK").into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "NOT_SERVING").into_response(),
    }
}

pub(super) async fn metrics(State(state): State<StatusState>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render metrics").into_response()
        }
    }
}
