//! Call initiation and offline simulation handlers

use super::AppState;
use crate::application::{simulate_conversation, TurnResult};
use crate::domain::lead::CallEventKind;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::PhoneNumber;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct StartCallRequest {
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct StartCallResponse {
    pub sid: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({"ok": true}))
}

/// Start an outbound call toward a prospect
pub async fn start_call(
    State(state): State<AppState>,
    Json(request): Json<StartCallRequest>,
) -> Result<Json<StartCallResponse>, (StatusCode, String)> {
    let to = PhoneNumber::parse(&request.to)
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let sid = state
        .control
        .start_call(to.as_str())
        .await
        .map_err(map_domain_error)?;

    state
        .store
        .append_event(
            CallEventKind::OutboundInitiated,
            json!({"to": to.as_str()}),
            sid.as_str(),
        )
        .await
        .map_err(map_domain_error)?;

    Ok(Json(StartCallResponse {
        sid: sid.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub phone: String,
    pub utterances: Vec<String>,
    pub seconds_per_turn: Option<u32>,
}

/// Replay a scripted conversation through the turn orchestrator
pub async fn simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<Vec<TurnResult>>, (StatusCode, String)> {
    let phone = PhoneNumber::parse(&request.phone)
        .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let seconds_per_turn = request
        .seconds_per_turn
        .unwrap_or(state.config.policy.default_turn_secs);

    let results = simulate_conversation(
        state.store.clone(),
        state.turn_backend.clone(),
        state.config.policy.clone(),
        phone.as_str(),
        &request.utterances,
        seconds_per_turn,
    )
    .await
    .map_err(map_domain_error)?;

    Ok(Json(results))
}

fn map_domain_error(e: DomainError) -> (StatusCode, String) {
    error!(error = %e, "request failed");
    let status = match &e {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
