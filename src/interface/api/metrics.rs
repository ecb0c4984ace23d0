//! Prometheus metrics

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    describe_counter!("leadline_turns_total", "Total caller turns ingested");
    describe_counter!(
        "leadline_outcomes_total",
        "Terminal call outcomes by disposition"
    );
    describe_counter!(
        "leadline_stream_frames_total",
        "Telephony media-stream frames processed by kind"
    );

    handle
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    (StatusCode::OK, prometheus_handle.render()).into_response()
}

/// Record one processed telephony frame
pub fn record_stream_frame(kind: &'static str) {
    counter!("leadline_stream_frames_total", "kind" => kind).increment(1);
}
