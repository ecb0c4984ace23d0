//! Streaming session bridge
//!
//! Relays a telephony media stream into the realtime reasoning session and
//! reacts to the tool calls the session emits. Telephony frames are handled
//! strictly in arrival order; pending reasoning events are drained with a
//! short bound per media frame so a slow backend can never stall the audio
//! relay, and with a longer bound for the final flush at stop.
//!
//! Terminal side effects (transfer redirect, callback write) fire at most
//! once per call, and teardown is guaranteed: `finish` closes the session and
//! appends exactly one STREAM_CLOSED event on every path.

use crate::domain::intent::fields_from_value;
use crate::domain::lead::{CallEventKind, Interest, LeadRepository};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::CallSid;
use crate::infrastructure::llm::{RealtimeEvent, RealtimeSession};
use crate::infrastructure::telephony::TelephonyControl;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Bounded-wait configuration for draining reasoning-session events
#[derive(Debug, Clone, Copy)]
pub struct DrainBounds {
    /// Best-effort poll while audio is flowing
    pub media: Duration,
    /// Final flush after the telephony leg stops
    pub finish: Duration,
}

impl Default for DrainBounds {
    fn default() -> Self {
        Self {
            media: Duration::from_millis(20),
            finish: Duration::from_millis(500),
        }
    }
}

/// One framed event from the telephony media stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelephonyFrame {
    Start { call_sid: String, from: String },
    Media { payload: String },
    Stop,
    /// Frame kinds the bridge does not interpret (mark, connected, ...)
    Other,
}

impl TelephonyFrame {
    /// Parse the provider's JSON envelope; unknown events are passed through
    /// as `Other` rather than rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(raw).ok()?;
        match value.get("event").and_then(|e| e.as_str())? {
            "start" => {
                let start = value.get("start")?;
                Some(TelephonyFrame::Start {
                    call_sid: start
                        .get("callSid")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                    from: start
                        .get("from")
                        .and_then(|v| v.as_str())
                        .unwrap_or("")
                        .to_string(),
                })
            }
            "media" => Some(TelephonyFrame::Media {
                payload: value
                    .get("media")
                    .and_then(|m| m.get("payload"))
                    .and_then(|p| p.as_str())
                    .unwrap_or("")
                    .to_string(),
            }),
            "stop" => Some(TelephonyFrame::Stop),
            _ => Some(TelephonyFrame::Other),
        }
    }
}

/// Bridges one call between the telephony transport and the realtime session
pub struct StreamBridge {
    call_sid: CallSid,
    phone: String,
    session: Box<dyn RealtimeSession>,
    store: Arc<dyn LeadRepository>,
    control: Arc<dyn TelephonyControl>,
    bounds: DrainBounds,
    qualified: bool,
    transfer_done: bool,
    callback_done: bool,
    finished: bool,
}

impl StreamBridge {
    pub fn new(
        call_sid: CallSid,
        phone: String,
        session: Box<dyn RealtimeSession>,
        store: Arc<dyn LeadRepository>,
        control: Arc<dyn TelephonyControl>,
        bounds: DrainBounds,
    ) -> Self {
        Self {
            call_sid,
            phone,
            session,
            store,
            control,
            bounds,
            qualified: false,
            transfer_done: false,
            callback_done: false,
            finished: false,
        }
    }

    /// Configure the reasoning session; must run once before frames flow
    pub async fn start(&mut self, instructions: &str) -> Result<()> {
        self.session.configure(instructions).await
    }

    /// Process one telephony frame in arrival order
    pub async fn handle_frame(&mut self, frame: TelephonyFrame) -> Result<()> {
        match frame {
            TelephonyFrame::Start { .. } => {
                self.store
                    .append_event(
                        CallEventKind::CallStart,
                        json!({"from": self.phone}),
                        self.call_sid.as_str(),
                    )
                    .await?;
                self.session.create_input_buffer().await?;
            }
            TelephonyFrame::Media { payload } => {
                self.session.append_audio(&payload).await?;
                self.session.request_response().await?;
                self.drain(self.bounds.media).await?;
            }
            TelephonyFrame::Stop => {
                // The final drain and stop event must happen even when the
                // session send path is already broken.
                if let Err(e) = self.commit_and_flush().await {
                    warn!(sid = %self.call_sid, error = %e, "final flush failed");
                }
                self.store
                    .append_event(CallEventKind::CallStop, json!({}), self.call_sid.as_str())
                    .await?;
            }
            TelephonyFrame::Other => {}
        }
        Ok(())
    }

    async fn commit_and_flush(&mut self) -> Result<()> {
        let commit = self.session.commit_input().await;
        let drain = self.drain(self.bounds.finish).await;
        commit.and(drain)
    }

    /// Drain pending reasoning-session events until the bound elapses, the
    /// response cycle completes, or the backend reports an error.
    async fn drain(&mut self, wait: Duration) -> Result<()> {
        loop {
            let event = match self.session.next_event(wait).await {
                Ok(Some(event)) => event,
                // Nothing pending within the bound
                Ok(None) => return Ok(()),
                Err(e) => {
                    debug!(sid = %self.call_sid, error = %e, "reasoning session read failed during drain");
                    return Err(e);
                }
            };

            match event {
                RealtimeEvent::OutputTextDelta { .. } => {}
                RealtimeEvent::FunctionCall { name, arguments } => {
                    self.handle_tool_call(&name, &arguments).await?;
                }
                RealtimeEvent::Completed => return Ok(()),
                RealtimeEvent::Error { detail } => {
                    self.store
                        .append_event(
                            CallEventKind::AiError,
                            json!({"error": detail}),
                            self.call_sid.as_str(),
                        )
                        .await?;
                    return Ok(());
                }
                RealtimeEvent::Unknown { kind } => {
                    debug!(sid = %self.call_sid, kind = %kind, "ignoring realtime event");
                }
            }
        }
    }

    async fn handle_tool_call(&mut self, name: &str, arguments: &serde_json::Value) -> Result<()> {
        self.store
            .append_event(
                CallEventKind::AiToolCall,
                json!({"name": name, "args": arguments}),
                self.call_sid.as_str(),
            )
            .await?;

        match name {
            "lead_detect" => {
                let fields = fields_from_value(arguments);
                let lead = self
                    .store
                    .upsert(&self.phone, &fields.to_lead_update())
                    .await?;

                if fields.interest.is_positive() {
                    self.qualified = true;
                    self.store.mark_qualified(lead.id, true).await?;
                }

                if fields.interest == Interest::Later
                    && !fields.callback_window.is_empty()
                    && !self.callback_done
                {
                    self.callback_done = true;
                    let callback = self
                        .store
                        .create_callback(lead.id, &fields.callback_window, &fields.notes)
                        .await?;
                    self.store
                        .append_event(
                            CallEventKind::OutcomeCallback,
                            json!({"lead_id": lead.id, "callback_id": callback.id, "window": callback.window}),
                            self.call_sid.as_str(),
                        )
                        .await?;
                    info!(sid = %self.call_sid, window = %callback.window, "callback scheduled");
                }
            }
            "request_transfer" => {
                let consent = arguments
                    .get("consent")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);

                if consent && self.qualified && !self.transfer_done {
                    self.transfer_done = true;
                    self.store
                        .append_event(
                            CallEventKind::OutcomeTransfer,
                            json!({"consent": true}),
                            self.call_sid.as_str(),
                        )
                        .await?;
                    self.control.redirect_to_transfer(&self.call_sid).await?;
                    info!(sid = %self.call_sid, "caller transferred to acquisitions lead");
                }
            }
            other => {
                warn!(sid = %self.call_sid, tool = %other, "unrecognized tool call");
            }
        }

        Ok(())
    }

    /// Guaranteed teardown: close the reasoning session and log exactly one
    /// closed event. Safe to call on every exit path; repeats are no-ops.
    pub async fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        if let Err(e) = self.session.close().await {
            debug!(sid = %self.call_sid, error = %e, "realtime session close failed");
        }
        self.store
            .append_event(CallEventKind::StreamClosed, json!({}), self.call_sid.as_str())
            .await
    }
}
