//! Reasoning backend adapters
//!
//! Two shapes: a request/response text classifier for the turn-based path,
//! and a persistent realtime session for the streaming path. Both are ports
//! so the orchestrators stay testable without a live backend.

pub mod prompt;
pub mod realtime;
pub mod responses;

pub use realtime::{OpenAiRealtimeConnector, RealtimeConnector, RealtimeEvent, RealtimeSession};
pub use responses::{turn_backend_from_config, OpenAiTurnBackend, RuleTurnBackend, TurnBackend, TurnReply};
