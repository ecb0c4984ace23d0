//! Turn-based call orchestrator
//!
//! State machine `open -> (continue)* -> closed(outcome)`. Each incoming
//! utterance runs one classification cycle: audit the turn, invoke the
//! reasoning backend over a bounded trailing history window, merge-write the
//! extracted fields, then evaluate the decision policy and apply the side
//! effects of any terminal decision. Once closed, further input replays the
//! stored result without writes.

use crate::config::PolicyConfig;
use crate::domain::intent::{extract_fields, LeadFields};
use crate::domain::lead::{CallEventKind, Lead, LeadRepository, LeadUpdate};
use crate::domain::policy::{decide, Decision, Outcome};
use crate::domain::session::ConversationState;
use crate::domain::shared::result::Result;
use crate::infrastructure::llm::{prompt::TURN_SYSTEM_PROMPT, TurnBackend};
use metrics::counter;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Caller-facing disposition for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Disposition {
    Continue,
    Dnc {
        reason: String,
        message: String,
    },
    Callback {
        callback_id: i64,
        window: String,
        message: String,
    },
    Transfer {
        message: String,
    },
}

impl Disposition {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Disposition::Continue)
    }
}

/// Result of ingesting one utterance
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    pub lead: Option<Lead>,
    pub fields: LeadFields,
    pub disposition: Disposition,
    pub elapsed_secs: u32,
}

const MSG_DNC: &str = "Understood, removing you from our list. Have a great day.";
const MSG_DNC_TIMEOUT: &str = "Thanks for your time, no worries. We'll remove you from our list.";
const MSG_CALLBACK: &str = "We'll call you back then. Thank you!";
const MSG_TRANSFER: &str = "Let me connect you with my acquisitions lead now for numbers.";

/// Owns one call's conversation state; exactly one orchestrator per call
pub struct TurnOrchestrator {
    state: ConversationState,
    store: Arc<dyn LeadRepository>,
    backend: Arc<dyn TurnBackend>,
    policy: PolicyConfig,
    /// Stored terminal result, replayed verbatim after close
    final_result: Option<TurnResult>,
}

impl TurnOrchestrator {
    /// Open a call: registers the lead row up front so every later
    /// merge-write hits an existing record.
    pub async fn begin(
        phone: &str,
        call_sid: &str,
        store: Arc<dyn LeadRepository>,
        backend: Arc<dyn TurnBackend>,
        policy: PolicyConfig,
    ) -> Result<Self> {
        store.upsert(phone, &LeadUpdate::default()).await?;
        Ok(Self {
            state: ConversationState::new(phone, call_sid),
            store,
            backend,
            policy,
            final_result: None,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome
    }

    /// Ingest one caller utterance and run a full classification cycle.
    ///
    /// `approx_secs` is the caller-supplied duration of this turn; the
    /// timebox is advisory and computed from these increments.
    pub async fn ingest_user_text(&mut self, text: &str, approx_secs: u32) -> Result<TurnResult> {
        if self.state.closed {
            if let Some(stored) = &self.final_result {
                debug!(sid = %self.state.call_sid, "call already closed, replaying outcome");
                return Ok(stored.clone());
            }
        }

        self.state.append_user(text);
        self.store
            .append_event(
                CallEventKind::Turn,
                json!({"from": "user", "text": text, "elapsed": self.state.elapsed_secs}),
                &self.state.call_sid,
            )
            .await?;
        self.state.elapsed_secs += approx_secs;
        counter!("leadline_turns_total").increment(1);

        // Backend failures must not end the call: degrade to an all-unknown
        // record and let the timebox converge the exit.
        let history = self.state.trailing(self.policy.history_window);
        let fields = match self
            .backend
            .complete(history, TURN_SYSTEM_PROMPT, self.state.last_response_id.as_deref())
            .await
        {
            Ok(reply) => {
                self.store
                    .append_event(
                        CallEventKind::RawLlm,
                        json!({"text": reply.text, "response_id": reply.response_id}),
                        &self.state.call_sid,
                    )
                    .await?;
                self.state.last_response_id = reply.response_id;
                extract_fields(&reply.text)
            }
            Err(e) => {
                warn!(sid = %self.state.call_sid, error = %e, "backend invocation failed, continuing with unknown fields");
                self.store
                    .append_event(
                        CallEventKind::RawLlm,
                        json!({"error": e.to_string()}),
                        &self.state.call_sid,
                    )
                    .await?;
                LeadFields::default()
            }
        };

        let lead = self
            .store
            .upsert(&self.state.phone, &fields.to_lead_update())
            .await?;

        let decision = decide(&fields, self.state.elapsed_secs, self.policy.timebox_secs);
        let disposition = self.apply_decision(&decision, &lead).await?;

        // Refresh so the returned snapshot reflects outcome side effects
        let lead = self.store.find_by_phone(&self.state.phone).await?;

        let result = TurnResult {
            lead,
            fields,
            disposition,
            elapsed_secs: self.state.elapsed_secs,
        };
        if result.disposition.is_terminal() {
            self.final_result = Some(result.clone());
        }
        Ok(result)
    }

    async fn apply_decision(&mut self, decision: &Decision, lead: &Lead) -> Result<Disposition> {
        let disposition = match decision {
            Decision::Continue => Disposition::Continue,
            Decision::Dnc { reason, notes } => {
                self.store
                    .append_event(
                        CallEventKind::OutcomeDnc,
                        json!({"lead_id": lead.id, "reason": reason.as_str(), "notes": notes}),
                        &self.state.call_sid,
                    )
                    .await?;
                self.state.close(Outcome::Dnc);
                info!(sid = %self.state.call_sid, reason = reason.as_str(), "call closed: do not contact");
                Disposition::Dnc {
                    reason: reason.as_str().to_string(),
                    message: match reason {
                        crate::domain::policy::DncReason::StatedIntent => MSG_DNC.to_string(),
                        crate::domain::policy::DncReason::Timebox => MSG_DNC_TIMEOUT.to_string(),
                    },
                }
            }
            Decision::Callback { window, notes } => {
                let callback = self.store.create_callback(lead.id, window, notes).await?;
                self.store
                    .append_event(
                        CallEventKind::OutcomeCallback,
                        json!({"lead_id": lead.id, "callback_id": callback.id, "window": callback.window}),
                        &self.state.call_sid,
                    )
                    .await?;
                self.state.close(Outcome::Callback);
                info!(sid = %self.state.call_sid, window = %callback.window, "call closed: callback scheduled");
                Disposition::Callback {
                    callback_id: callback.id,
                    window: callback.window,
                    message: MSG_CALLBACK.to_string(),
                }
            }
            Decision::Transfer => {
                if !lead.qualified {
                    self.store.mark_qualified(lead.id, true).await?;
                }
                self.store
                    .append_event(
                        CallEventKind::OutcomeTransfer,
                        json!({"lead_id": lead.id}),
                        &self.state.call_sid,
                    )
                    .await?;
                self.state.close(Outcome::Transfer);
                info!(sid = %self.state.call_sid, "call closed: transferring to acquisitions lead");
                Disposition::Transfer {
                    message: MSG_TRANSFER.to_string(),
                }
            }
        };

        if let Some(outcome) = decision.outcome() {
            counter!("leadline_outcomes_total", "outcome" => outcome.as_str()).increment(1);
        }
        Ok(disposition)
    }
}
