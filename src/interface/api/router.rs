//! API Router configuration

use super::call_handler::{health_check, simulate, start_call};
use super::metrics::metrics_handler;
use super::stream_handler::media_stream_handler;
use super::voice_handler::{answer_call, transfer_call};
use super::AppState;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/call/start", post(start_call))
        .route("/api/simulate", post(simulate));

    // Webhooks and the media stream the telephony provider calls into
    let twilio_routes = Router::new()
        .route("/twilio/voice/answer", post(answer_call))
        .route("/twilio/voice/transfer", post(transfer_call))
        .route("/twilio/stream/media", get(media_stream_handler));

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    Router::new()
        .merge(api_routes)
        .merge(twilio_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
