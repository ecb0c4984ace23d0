//! Realtime reasoning session
//!
//! Persistent bidirectional session toward the realtime backend. The port is
//! a small command/event surface (configure, append audio, commit, request a
//! response cycle, pull the next event with a bounded wait) so the streaming
//! bridge can be driven by a scripted fake in tests.

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

/// Inbound event from the realtime session
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// Partial transcript text
    OutputTextDelta { delta: String },
    /// Structured tool invocation emitted in place of bulk JSON
    FunctionCall {
        name: String,
        arguments: serde_json::Value,
    },
    /// End of one response cycle
    Completed,
    /// Backend-reported error; carries the full event for the audit log
    Error { detail: serde_json::Value },
    /// Anything this bridge does not interpret
    Unknown { kind: String },
}

impl RealtimeEvent {
    /// Fail-soft wire parsing: unrecognized or malformed frames become
    /// `Unknown` instead of erroring.
    pub fn parse(raw: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(_) => {
                return RealtimeEvent::Unknown {
                    kind: "unparseable".to_string(),
                }
            }
        };

        let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
        match kind {
            "response.output_text.delta" => RealtimeEvent::OutputTextDelta {
                delta: value
                    .get("delta")
                    .and_then(|d| d.as_str())
                    .unwrap_or("")
                    .to_string(),
            },
            "response.function_call" => {
                let name = value
                    .get("name")
                    .and_then(|n| n.as_str())
                    .unwrap_or("")
                    .to_string();
                // Arguments arrive either as an object or as a JSON string
                let arguments = match value.get("arguments") {
                    Some(serde_json::Value::String(s)) => {
                        serde_json::from_str(s).unwrap_or(serde_json::Value::Null)
                    }
                    Some(v) => v.clone(),
                    None => serde_json::Value::Null,
                };
                RealtimeEvent::FunctionCall { name, arguments }
            }
            "response.completed" => RealtimeEvent::Completed,
            "response.error" => RealtimeEvent::Error { detail: value },
            other => RealtimeEvent::Unknown {
                kind: other.to_string(),
            },
        }
    }
}

/// Persistent realtime session port
#[async_trait]
pub trait RealtimeSession: Send {
    /// One-time session configuration: instructions, audio formats, tools
    async fn configure(&mut self, instructions: &str) -> Result<()>;

    /// Initialize the input audio buffer
    async fn create_input_buffer(&mut self) -> Result<()>;

    /// Append one opaque base64 audio chunk to the input buffer
    async fn append_audio(&mut self, payload_b64: &str) -> Result<()>;

    /// Commit the input buffer (final flush at stream stop)
    async fn commit_input(&mut self) -> Result<()>;

    /// Ask the backend for a response cycle
    async fn request_response(&mut self) -> Result<()>;

    /// Pull the next event, waiting at most `wait`; `None` means the bound
    /// elapsed with nothing pending
    async fn next_event(&mut self, wait: Duration) -> Result<Option<RealtimeEvent>>;

    /// Close the underlying connection
    async fn close(&mut self) -> Result<()>;
}

/// Factory for per-call sessions
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RealtimeSession>>;
}

/// Declared tool surface for the realtime session
fn tool_schema() -> serde_json::Value {
    json!([
        {
            "type": "function",
            "name": "lead_detect",
            "description": "Capture current seller intent and fields.",
            "parameters": {
                "type": "object",
                "properties": {
                    "interest": {"type": "string", "enum": ["yes", "maybe", "later", "no", "dnc", "unknown"]},
                    "price_range": {"type": "string"},
                    "timing": {"type": "string"},
                    "condition": {"type": "string"},
                    "owner_status": {"type": "string"},
                    "callback_window": {"type": "string"},
                    "notes": {"type": "string"}
                },
                "required": ["interest"]
            }
        },
        {
            "type": "function",
            "name": "request_transfer",
            "description": "Request warm transfer to the acquisitions lead.",
            "parameters": {
                "type": "object",
                "properties": {"consent": {"type": "boolean"}},
                "required": ["consent"]
            }
        }
    ])
}

/// Realtime session over a WebSocket toward the OpenAI realtime API
pub struct OpenAiRealtimeSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl OpenAiRealtimeSession {
    async fn send_json(&mut self, value: serde_json::Value) -> Result<()> {
        self.ws
            .send(Message::Text(value.to_string()))
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))
    }
}

#[async_trait]
impl RealtimeSession for OpenAiRealtimeSession {
    async fn configure(&mut self, instructions: &str) -> Result<()> {
        self.send_json(json!({
            "type": "session.update",
            "session": {
                "instructions": instructions,
                "input_audio_format": {"type": "g711_ulaw", "sampling_rate_hz": 8000},
                "output_audio_format": {"type": "g711_ulaw", "sampling_rate_hz": 8000},
                "tools": tool_schema(),
            }
        }))
        .await
    }

    async fn create_input_buffer(&mut self) -> Result<()> {
        self.send_json(json!({"type": "input_audio_buffer.create"})).await
    }

    async fn append_audio(&mut self, payload_b64: &str) -> Result<()> {
        self.send_json(json!({
            "type": "input_audio_buffer.append",
            "audio": payload_b64,
        }))
        .await
    }

    async fn commit_input(&mut self) -> Result<()> {
        self.send_json(json!({"type": "input_audio_buffer.commit"})).await
    }

    async fn request_response(&mut self) -> Result<()> {
        self.send_json(json!({
            "type": "response.create",
            "response": {"modalities": ["audio", "text"]},
        }))
        .await
    }

    async fn next_event(&mut self, wait: Duration) -> Result<Option<RealtimeEvent>> {
        loop {
            let frame = match tokio::time::timeout(wait, self.ws.next()).await {
                Err(_) => return Ok(None),
                Ok(None) => {
                    return Err(DomainError::TransportFault(
                        "realtime session closed".to_string(),
                    ))
                }
                Ok(Some(Err(e))) => return Err(DomainError::TransportFault(e.to_string())),
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                Message::Text(text) => return Ok(Some(RealtimeEvent::parse(&text))),
                Message::Close(_) => {
                    return Err(DomainError::TransportFault(
                        "realtime session closed".to_string(),
                    ))
                }
                // Control frames are transparent to the event stream
                _ => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.ws
            .close(None)
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))
    }
}

/// Connector holding the credentials and model selection
pub struct OpenAiRealtimeConnector {
    api_key: String,
    model: String,
}

impl OpenAiRealtimeConnector {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, model }
    }
}

#[async_trait]
impl RealtimeConnector for OpenAiRealtimeConnector {
    async fn connect(&self) -> Result<Box<dyn RealtimeSession>> {
        if self.api_key.is_empty() {
            return Err(DomainError::BackendUnavailable(
                "realtime backend not configured".to_string(),
            ));
        }

        let url = format!("wss://api.openai.com/v1/realtime?model={}", self.model);
        let mut request = url
            .clone()
            .into_client_request()
            .map_err(|e| DomainError::TransportFault(e.to_string()))?;
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Bearer {}", self.api_key)
                .parse()
                .map_err(|_| DomainError::Config("invalid API key header".to_string()))?,
        );

        info!(model = %self.model, "connecting realtime session");
        let (ws, response) = connect_async(request)
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))?;
        debug!(status = %response.status(), url = %url, "realtime session connected");

        Ok(Box::new(OpenAiRealtimeSession { ws }))
    }
}
