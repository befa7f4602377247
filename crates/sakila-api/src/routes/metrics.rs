//! Prometheus metrics endpoint

use axum::{Router, extract::State, routing::get};

use crate::state::MetricsHandle;

/// Create metrics routes with the Prometheus handle
///
/// Mounted outside the authorization gate, like `/health`.
pub fn routes(handle: MetricsHandle) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(handle)
}

/// GET /metrics
async fn get_metrics(State(handle): State<MetricsHandle>) -> String {
    handle.render()
}
