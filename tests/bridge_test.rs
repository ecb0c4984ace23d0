//! Stream Bridge Integration Tests

use async_trait::async_trait;
use leadline::domain::lead::{CallEventKind, Interest, LeadRepository};
use leadline::domain::shared::error::DomainError;
use leadline::domain::shared::value_objects::CallSid;
use leadline::infrastructure::bridge::{DrainBounds, StreamBridge, TelephonyFrame};
use leadline::infrastructure::llm::{RealtimeEvent, RealtimeSession};
use leadline::infrastructure::persistence::MemoryLeadRepository;
use leadline::infrastructure::telephony::TelephonyControl;
use leadline::Result;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeSessionInner {
    pending: VecDeque<RealtimeEvent>,
    fail_commit: bool,
    configured: bool,
    buffer_created: bool,
    appended: Vec<String>,
    commits: u32,
    closed: bool,
}

/// Scripted realtime session; the test pushes events, the bridge drains them
#[derive(Clone)]
struct FakeRealtimeSession {
    inner: Arc<Mutex<FakeSessionInner>>,
}

impl FakeRealtimeSession {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSessionInner::default())),
        }
    }

    fn push(&self, event: RealtimeEvent) {
        self.inner.lock().unwrap().pending.push_back(event);
    }

    fn set_fail_commit(&self) {
        self.inner.lock().unwrap().fail_commit = true;
    }
}

#[async_trait]
impl RealtimeSession for FakeRealtimeSession {
    async fn configure(&mut self, _instructions: &str) -> Result<()> {
        self.inner.lock().unwrap().configured = true;
        Ok(())
    }

    async fn create_input_buffer(&mut self) -> Result<()> {
        self.inner.lock().unwrap().buffer_created = true;
        Ok(())
    }

    async fn append_audio(&mut self, payload_b64: &str) -> Result<()> {
        self.inner.lock().unwrap().appended.push(payload_b64.to_string());
        Ok(())
    }

    async fn commit_input(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.commits += 1;
        if inner.fail_commit {
            return Err(DomainError::TransportFault("commit failed".to_string()));
        }
        Ok(())
    }

    async fn request_response(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_event(&mut self, _wait: Duration) -> Result<Option<RealtimeEvent>> {
        Ok(self.inner.lock().unwrap().pending.pop_front())
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Records transfer redirects instead of calling the provider
#[derive(Default)]
struct FakeTelephony {
    redirects: Mutex<Vec<String>>,
}

impl FakeTelephony {
    fn redirect_count(&self) -> usize {
        self.redirects.lock().unwrap().len()
    }
}

#[async_trait]
impl TelephonyControl for FakeTelephony {
    async fn start_call(&self, _to: &str) -> Result<CallSid> {
        Ok(CallSid::new("CA-fake"))
    }

    async fn redirect_to_transfer(&self, call_sid: &CallSid) -> Result<()> {
        self.redirects.lock().unwrap().push(call_sid.to_string());
        Ok(())
    }
}

fn make_bridge(
    session: FakeRealtimeSession,
    store: Arc<MemoryLeadRepository>,
    control: Arc<FakeTelephony>,
) -> StreamBridge {
    StreamBridge::new(
        CallSid::new("CA-stream-1"),
        "+15552220001".to_string(),
        Box::new(session),
        store as Arc<dyn LeadRepository>,
        control as Arc<dyn TelephonyControl>,
        DrainBounds::default(),
    )
}

fn media_frame() -> TelephonyFrame {
    TelephonyFrame::Media {
        payload: "b64audio==".to_string(),
    }
}

fn lead_detect(args: serde_json::Value) -> RealtimeEvent {
    RealtimeEvent::FunctionCall {
        name: "lead_detect".to_string(),
        arguments: args,
    }
}

fn transfer_request(consent: bool) -> RealtimeEvent {
    RealtimeEvent::FunctionCall {
        name: "request_transfer".to_string(),
        arguments: json!({"consent": consent}),
    }
}

#[tokio::test]
async fn test_start_frame_opens_call_and_input_buffer() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    bridge.start("be helpful").await.unwrap();
    bridge
        .handle_frame(TelephonyFrame::Start {
            call_sid: "CA-stream-1".to_string(),
            from: "+15552220001".to_string(),
        })
        .await
        .unwrap();

    let inner = session.inner.lock().unwrap();
    assert!(inner.configured);
    assert!(inner.buffer_created);
    drop(inner);
    assert_eq!(store.events_of_kind(CallEventKind::CallStart).await.len(), 1);
}

#[tokio::test]
async fn test_lead_detect_merges_and_qualifies() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    session.push(lead_detect(json!({
        "interest": "maybe",
        "price_range": "360k",
        "owner_status": "owner"
    })));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    let lead = store.find_by_phone("+15552220001").await.unwrap().unwrap();
    assert_eq!(lead.interest, Interest::Maybe);
    assert_eq!(lead.price_range, "360k");
    assert!(lead.qualified);
    assert_eq!(store.events_of_kind(CallEventKind::AiToolCall).await.len(), 1);

    // A later all-unknown detection must not erase what was captured
    session.push(lead_detect(json!({"interest": "unknown"})));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    let lead = store.find_by_phone("+15552220001").await.unwrap().unwrap();
    assert_eq!(lead.interest, Interest::Maybe);
    assert_eq!(lead.price_range, "360k");
}

#[tokio::test]
async fn test_transfer_requires_prior_qualification() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control.clone());

    // Consent without any qualifying detection is ignored
    session.push(transfer_request(true));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();
    assert_eq!(control.redirect_count(), 0);

    // Qualify, then consent routes the call
    session.push(lead_detect(json!({"interest": "yes"})));
    session.push(transfer_request(true));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    assert_eq!(control.redirect_count(), 1);
    assert_eq!(
        store.events_of_kind(CallEventKind::OutcomeTransfer).await.len(),
        1
    );
}

#[tokio::test]
async fn test_transfer_fires_at_most_once() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control.clone());

    session.push(lead_detect(json!({"interest": "yes"})));
    session.push(transfer_request(true));
    session.push(transfer_request(true));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    // Duplicate consent on a later frame is also ignored
    session.push(transfer_request(true));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    assert_eq!(control.redirect_count(), 1);
    assert_eq!(
        store.events_of_kind(CallEventKind::OutcomeTransfer).await.len(),
        1
    );
}

#[tokio::test]
async fn test_declined_consent_never_transfers() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control.clone());

    session.push(lead_detect(json!({"interest": "yes"})));
    session.push(transfer_request(false));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    assert_eq!(control.redirect_count(), 0);
    assert!(store.events_of_kind(CallEventKind::OutcomeTransfer).await.is_empty());
}

#[tokio::test]
async fn test_later_with_window_schedules_one_callback() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    // No window yet: no callback row
    session.push(lead_detect(json!({"interest": "later"})));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();
    assert!(store.callbacks().await.is_empty());

    // Window captured: exactly one callback, repeats ignored
    session.push(lead_detect(json!({"interest": "later", "callback_window": "tomorrow 9-11am"})));
    session.push(lead_detect(json!({"interest": "later", "callback_window": "tomorrow 9-11am"})));
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();

    let callbacks = store.callbacks().await;
    assert_eq!(callbacks.len(), 1);
    assert_eq!(callbacks[0].window, "tomorrow 9-11am");
    assert_eq!(
        store.events_of_kind(CallEventKind::OutcomeCallback).await.len(),
        1
    );
}

#[tokio::test]
async fn test_stop_with_failing_commit_still_drains_and_logs() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    session.set_fail_commit();
    session.push(lead_detect(json!({"interest": "maybe"})));
    session.push(RealtimeEvent::Completed);

    bridge.handle_frame(TelephonyFrame::Stop).await.unwrap();

    // The pending detection was still drained before the stop event
    let lead = store.find_by_phone("+15552220001").await.unwrap().unwrap();
    assert_eq!(lead.interest, Interest::Maybe);
    assert_eq!(store.events_of_kind(CallEventKind::CallStop).await.len(), 1);
}

#[tokio::test]
async fn test_backend_error_is_audited_and_relay_continues() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    session.push(RealtimeEvent::Error {
        detail: json!({"type": "response.error", "message": "overloaded"}),
    });
    bridge.handle_frame(media_frame()).await.unwrap();
    assert_eq!(store.events_of_kind(CallEventKind::AiError).await.len(), 1);

    // Subsequent frames keep flowing
    session.push(RealtimeEvent::Completed);
    bridge.handle_frame(media_frame()).await.unwrap();
    assert_eq!(session.inner.lock().unwrap().appended.len(), 2);
}

#[tokio::test]
async fn test_finish_closes_session_exactly_once() {
    let session = FakeRealtimeSession::new();
    let store = Arc::new(MemoryLeadRepository::new());
    let control = Arc::new(FakeTelephony::default());
    let mut bridge = make_bridge(session.clone(), store.clone(), control);

    bridge.finish().await.unwrap();
    bridge.finish().await.unwrap();
    bridge.finish().await.unwrap();

    assert!(session.inner.lock().unwrap().closed);
    assert_eq!(
        store.events_of_kind(CallEventKind::StreamClosed).await.len(),
        1
    );
}
