//! TwiML voice webhooks
//!
//! The telephony provider fetches these documents: `answer` greets and opens
//! the bidirectional media stream, `transfer` dials the acquisitions lead.

use super::AppState;
use crate::domain::lead::CallEventKind;
use crate::infrastructure::telephony::twiml;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Form;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

#[derive(Debug, Deserialize, Default)]
pub struct VoiceWebhookForm {
    #[serde(rename = "CallSid", default)]
    pub call_sid: String,
    #[serde(rename = "From", default)]
    pub from: String,
}

/// Answer webhook: log the pickup and return the stream-start document
pub async fn answer_call(
    State(state): State<AppState>,
    Form(form): Form<VoiceWebhookForm>,
) -> impl IntoResponse {
    if let Err(e) = state
        .store
        .append_event(
            CallEventKind::CallAnswered,
            json!({"from": form.from}),
            &form.call_sid,
        )
        .await
    {
        warn!(error = %e, "failed to log call answer");
    }

    let document = twiml::answer_document(
        &state.config.telephony.stream_url(),
        &state.config.stream.greeting,
    );
    ([(header::CONTENT_TYPE, "text/xml")], document)
}

/// Transfer webhook: dial out to the acquisitions lead
pub async fn transfer_call(State(state): State<AppState>) -> impl IntoResponse {
    let document = twiml::transfer_document(
        &state.config.telephony.caller_id,
        &state.config.telephony.transfer_number,
    );
    ([(header::CONTENT_TYPE, "text/xml")], document)
}
