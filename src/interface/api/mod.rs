//! HTTP/WebSocket API surface

pub mod call_handler;
pub mod metrics;
pub mod router;
pub mod stream_handler;
pub mod voice_handler;

use crate::config::Config;
use crate::domain::lead::LeadRepository;
use crate::infrastructure::llm::{RealtimeConnector, TurnBackend};
use crate::infrastructure::telephony::TelephonyControl;
use std::sync::Arc;

pub use metrics::{init_metrics, record_stream_frame};
pub use router::build_router;

/// Shared handler state, built once at bootstrap
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LeadRepository>,
    pub control: Arc<dyn TelephonyControl>,
    pub turn_backend: Arc<dyn TurnBackend>,
    pub realtime: Arc<dyn RealtimeConnector>,
    pub config: Arc<Config>,
}
