//! Prometheus metrics handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    describe_counter!(
        "voice_calls_initiated_total",
        "Total number of outbound calls placed"
    );
    describe_counter!(
        "voice_calls_failed_total",
        "Total number of outbound call requests that failed"
    );
    describe_counter!(
        "voice_inbound_calls_total",
        "Total number of inbound voice webhooks received"
    );
    describe_counter!(
        "voice_inbound_sms_total",
        "Total number of inbound SMS webhooks received"
    );
    describe_counter!(
        "voice_streams_opened_total",
        "Total number of media stream connections opened"
    );
    describe_gauge!(
        "voice_active_streams",
        "Number of currently live media stream sessions"
    );

    handle
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}

/// Record outbound call placement
pub fn record_call_initiated() {
    counter!("voice_calls_initiated_total").increment(1);
}

/// Record outbound call failure
pub fn record_call_failed(status: u16) {
    counter!("voice_calls_failed_total", "status" => status.to_string()).increment(1);
}

/// Record inbound voice webhook
pub fn record_inbound_call() {
    counter!("voice_inbound_calls_total").increment(1);
}

/// Record inbound SMS webhook
pub fn record_inbound_sms() {
    counter!("voice_inbound_sms_total").increment(1);
}

/// Record media stream connection
pub fn record_stream_opened() {
    counter!("voice_streams_opened_total").increment(1);
}

/// Update active streams gauge
pub fn update_active_streams(count: usize) {
    gauge!("voice_active_streams").set(count as f64);
}
