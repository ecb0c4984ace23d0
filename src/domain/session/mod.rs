//! Per-call conversation state
//!
//! Owned exclusively by one orchestrator instance; mutated only on turns and
//! discarded when the call ends. Terminal projections are persisted through
//! the lead store, never this object.

use crate::domain::policy::Outcome;
use serde::{Deserialize, Serialize};

/// Speaker role in the turn history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the ordered turn history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEntry {
    pub role: Role,
    pub text: String,
}

/// In-memory state for one call
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub phone: String,
    pub call_sid: String,
    pub history: Vec<TurnEntry>,
    pub elapsed_secs: u32,
    pub closed: bool,
    pub outcome: Option<Outcome>,
    /// Opaque continuation token from the previous backend response
    pub last_response_id: Option<String>,
}

impl ConversationState {
    pub fn new(phone: impl Into<String>, call_sid: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            call_sid: call_sid.into(),
            history: Vec::new(),
            elapsed_secs: 0,
            closed: false,
            outcome: None,
            last_response_id: None,
        }
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.history.push(TurnEntry {
            role: Role::User,
            text: text.into(),
        });
    }

    /// Trailing window of history, most recent `n` entries
    pub fn trailing(&self, n: usize) -> &[TurnEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn close(&mut self, outcome: Outcome) {
        self.closed = true;
        self.outcome = Some(outcome);
    }
}
