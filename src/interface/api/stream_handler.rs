//! Telephony media-stream WebSocket endpoint
//!
//! Hosts the streaming session bridge for one call. Frames are processed in
//! arrival order; teardown is guaranteed on every exit path, including
//! transport faults, so the reasoning session is always closed and exactly
//! one STREAM_CLOSED audit event is written per connection.

use super::{record_stream_frame, AppState};
use crate::domain::lead::CallEventKind;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::CallSid;
use crate::infrastructure::bridge::{StreamBridge, TelephonyFrame};
use crate::infrastructure::llm::prompt::REALTIME_SYSTEM_PROMPT;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde_json::json;
use tracing::{error, info, warn};

/// Upgrade handler for the provider's media stream
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.protocols(["twilio", "audio"])
        .on_upgrade(move |socket| handle_media_stream(socket, state))
}

async fn handle_media_stream(mut socket: WebSocket, state: AppState) {
    let mut bridge: Option<StreamBridge> = None;
    let mut call_sid = String::new();

    if let Err(e) = run_stream(&mut socket, &state, &mut bridge, &mut call_sid).await {
        warn!(sid = %call_sid, error = %e, "media stream ended with error");
        if let Err(log_err) = state
            .store
            .append_event(
                CallEventKind::StreamError,
                json!({"error": e.to_string()}),
                &call_sid,
            )
            .await
        {
            error!(error = %log_err, "failed to log stream error");
        }
    }

    // Guaranteed teardown on all paths
    match bridge {
        Some(mut bridge) => {
            if let Err(e) = bridge.finish().await {
                error!(sid = %call_sid, error = %e, "bridge teardown failed");
            }
        }
        None => {
            if let Err(e) = state
                .store
                .append_event(CallEventKind::StreamClosed, json!({}), &call_sid)
                .await
            {
                error!(error = %e, "failed to log stream close");
            }
        }
    }
}

async fn run_stream(
    socket: &mut WebSocket,
    state: &AppState,
    bridge: &mut Option<StreamBridge>,
    call_sid: &mut String,
) -> Result<()> {
    while let Some(message) = socket.recv().await {
        let message = message.map_err(|e| DomainError::TransportFault(e.to_string()))?;
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let Some(frame) = TelephonyFrame::parse(&text) else {
            warn!(sid = %call_sid, "discarding unparseable telephony frame");
            continue;
        };

        process_frame(state, bridge, call_sid, frame).await?;
    }
    Ok(())
}

async fn process_frame(
    state: &AppState,
    bridge: &mut Option<StreamBridge>,
    call_sid: &mut String,
    frame: TelephonyFrame,
) -> Result<()> {
    if let TelephonyFrame::Start { call_sid: sid, from } = &frame {
        // A repeated start frame must not replace the live session
        if bridge.is_some() {
            warn!(sid = %sid, "ignoring repeated start frame");
            return Ok(());
        }

        *call_sid = sid.clone();
        record_stream_frame("start");
        info!(sid = %sid, from = %from, "media stream started");
        state
            .store
            .append_event(CallEventKind::StreamStart, json!({"from": from}), sid)
            .await?;

        let session = state.realtime.connect().await?;
        let mut new_bridge = StreamBridge::new(
            CallSid::new(sid.clone()),
            from.clone(),
            session,
            state.store.clone(),
            state.control.clone(),
            state.config.drain_bounds(),
        );
        new_bridge.start(REALTIME_SYSTEM_PROMPT).await?;
        *bridge = Some(new_bridge);
    }

    if let Some(bridge) = bridge.as_mut() {
        match &frame {
            TelephonyFrame::Media { .. } => record_stream_frame("media"),
            TelephonyFrame::Stop => {
                record_stream_frame("stop");
                state
                    .store
                    .append_event(CallEventKind::StreamStop, json!({}), call_sid)
                    .await?;
            }
            _ => {}
        }
        bridge.handle_frame(frame).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::infrastructure::llm::{
        RealtimeConnector, RealtimeEvent, RealtimeSession, RuleTurnBackend,
    };
    use crate::infrastructure::persistence::MemoryLeadRepository;
    use crate::infrastructure::telephony::NullTelephonyControl;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct IdleSession;

    #[async_trait]
    impl RealtimeSession for IdleSession {
        async fn configure(&mut self, _instructions: &str) -> Result<()> {
            Ok(())
        }
        async fn create_input_buffer(&mut self) -> Result<()> {
            Ok(())
        }
        async fn append_audio(&mut self, _payload_b64: &str) -> Result<()> {
            Ok(())
        }
        async fn commit_input(&mut self) -> Result<()> {
            Ok(())
        }
        async fn request_response(&mut self) -> Result<()> {
            Ok(())
        }
        async fn next_event(&mut self, _wait: Duration) -> Result<Option<RealtimeEvent>> {
            Ok(None)
        }
        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingConnector {
        connects: AtomicUsize,
    }

    #[async_trait]
    impl RealtimeConnector for CountingConnector {
        async fn connect(&self) -> Result<Box<dyn RealtimeSession>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(IdleSession))
        }
    }

    fn test_state(connector: Arc<CountingConnector>, store: Arc<MemoryLeadRepository>) -> AppState {
        AppState {
            store,
            control: Arc::new(NullTelephonyControl),
            turn_backend: Arc::new(RuleTurnBackend),
            realtime: connector,
            config: Arc::new(Config::default()),
        }
    }

    fn start_frame(sid: &str) -> TelephonyFrame {
        TelephonyFrame::Start {
            call_sid: sid.to_string(),
            from: "+15553330001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_repeated_start_keeps_existing_session() {
        let store = Arc::new(MemoryLeadRepository::new());
        let connector = Arc::new(CountingConnector::default());
        let state = test_state(connector.clone(), store.clone());

        let mut bridge = None;
        let mut call_sid = String::new();

        process_frame(&state, &mut bridge, &mut call_sid, start_frame("CA-ws-1"))
            .await
            .unwrap();
        process_frame(&state, &mut bridge, &mut call_sid, start_frame("CA-ws-1"))
            .await
            .unwrap();

        // One realtime session, one stream start, one call start
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
        assert_eq!(
            store.events_of_kind(CallEventKind::StreamStart).await.len(),
            1
        );
        assert_eq!(store.events_of_kind(CallEventKind::CallStart).await.len(), 1);

        // The surviving bridge still relays media
        let media = TelephonyFrame::Media {
            payload: "b64audio==".to_string(),
        };
        process_frame(&state, &mut bridge, &mut call_sid, media)
            .await
            .unwrap();
        assert!(bridge.is_some());
    }
}
