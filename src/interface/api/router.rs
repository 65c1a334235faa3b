//! API Router configuration

use super::media_ws::media_stream_handler;
use super::metrics_handler::metrics_handler;
use super::voice_handler::{
    get_call_status, health_check, initiate_outbound_call, list_call_logs, AppState,
};
use super::webhook_handler::{
    gather_result, inbound_sms, inbound_voice, outbound_script, status_callback,
};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let health_routes = Router::new().route("/health", get(health_check));

    // Call management routes
    let call_routes = Router::new()
        .route("/calls/outbound", post(initiate_outbound_call))
        .route("/calls", get(list_call_logs))
        .route("/calls/:call_sid", get(get_call_status));

    // Provider webhook routes (form-encoded callbacks)
    let webhook_routes = Router::new()
        .route("/webhooks/voice", post(inbound_voice))
        .route("/webhooks/sms", post(inbound_sms))
        .route("/webhooks/voice/gather", post(gather_result))
        .route("/webhooks/voice/outbound", post(outbound_script))
        .route("/webhooks/status", post(status_callback));

    // Media stream route
    let media_routes = Router::new().route("/media-stream", get(media_stream_handler));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(health_routes)
        .merge(call_routes)
        .merge(webhook_routes)
        .merge(media_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
