//! Lead qualification entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default callback window applied when the caller gave none
pub const DEFAULT_CALLBACK_WINDOW: &str = "next business day";

/// Caller's stated selling intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interest {
    Yes,
    Maybe,
    Later,
    No,
    Dnc,
    #[default]
    Unknown,
}

impl Interest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::Yes => "yes",
            Interest::Maybe => "maybe",
            Interest::Later => "later",
            Interest::No => "no",
            Interest::Dnc => "dnc",
            Interest::Unknown => "unknown",
        }
    }

    /// Total mapping from arbitrary input; anything unrecognized is `Unknown`
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "yes" => Interest::Yes,
            "maybe" => Interest::Maybe,
            "later" => Interest::Later,
            "no" => Interest::No,
            "dnc" => Interest::Dnc,
            _ => Interest::Unknown,
        }
    }

    /// A caller who said yes/maybe counts toward qualification
    pub fn is_positive(&self) -> bool {
        matches!(self, Interest::Yes | Interest::Maybe)
    }
}

impl Serialize for Interest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Interest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Interest::from_str(&s))
    }
}

/// Relationship of the person answering to the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OwnerStatus {
    Owner,
    Tenant,
    Relative,
    Agent,
    #[default]
    Unknown,
}

impl OwnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerStatus::Owner => "owner",
            OwnerStatus::Tenant => "tenant",
            OwnerStatus::Relative => "relative",
            OwnerStatus::Agent => "agent",
            OwnerStatus::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "owner" => OwnerStatus::Owner,
            "tenant" => OwnerStatus::Tenant,
            "relative" => OwnerStatus::Relative,
            "agent" => OwnerStatus::Agent,
            _ => OwnerStatus::Unknown,
        }
    }
}

impl Serialize for OwnerStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OwnerStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OwnerStatus::from_str(&s))
    }
}

/// A prospective seller, one row per phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub phone: String,
    pub owner_name: String,
    pub property_address: String,
    pub interest: Interest,
    pub price_range: String,
    pub timing: String,
    pub condition: String,
    pub owner_status: OwnerStatus,
    pub qualified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Fresh lead with no captured fields yet
    pub fn new(id: i64, phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            phone: phone.into(),
            owner_name: String::new(),
            property_address: String::new(),
            interest: Interest::Unknown,
            price_range: String::new(),
            timing: String::new(),
            condition: String::new(),
            owner_status: OwnerStatus::Unknown,
            qualified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge-on-write: non-empty incoming values overwrite, empty/unknown
    /// values never erase what was captured earlier in the call (or a prior one).
    pub fn merge(&mut self, update: &LeadUpdate) {
        fn keep_or(target: &mut String, incoming: &str) {
            if !incoming.trim().is_empty() {
                *target = incoming.trim().to_string();
            }
        }

        keep_or(&mut self.owner_name, &update.owner_name);
        keep_or(&mut self.property_address, &update.property_address);
        keep_or(&mut self.price_range, &update.price_range);
        keep_or(&mut self.timing, &update.timing);
        keep_or(&mut self.condition, &update.condition);
        if update.interest != Interest::Unknown {
            self.interest = update.interest;
        }
        if update.owner_status != OwnerStatus::Unknown {
            self.owner_status = update.owner_status;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial field set for a merge-write against a lead
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadUpdate {
    pub owner_name: String,
    pub property_address: String,
    pub interest: Interest,
    pub price_range: String,
    pub timing: String,
    pub condition: String,
    pub owner_status: OwnerStatus,
}

/// Scheduled callback, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Callback {
    pub id: i64,
    pub lead_id: i64,
    pub window: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Audit event vocabulary for the per-call append-only log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallEventKind {
    OutboundInitiated,
    CallAnswered,
    CallStart,
    CallStop,
    Turn,
    RawLlm,
    AiToolCall,
    AiError,
    OutcomeDnc,
    OutcomeCallback,
    OutcomeTransfer,
    StreamStart,
    StreamStop,
    StreamError,
    StreamClosed,
}

impl CallEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallEventKind::OutboundInitiated => "OUTBOUND_INITIATED",
            CallEventKind::CallAnswered => "CALL_ANSWERED",
            CallEventKind::CallStart => "CALL_START",
            CallEventKind::CallStop => "CALL_STOP",
            CallEventKind::Turn => "TURN",
            CallEventKind::RawLlm => "RAW_LLM",
            CallEventKind::AiToolCall => "AI_TOOL_CALL",
            CallEventKind::AiError => "AI_ERROR",
            CallEventKind::OutcomeDnc => "OUTCOME_DNC",
            CallEventKind::OutcomeCallback => "OUTCOME_CALLBACK",
            CallEventKind::OutcomeTransfer => "OUTCOME_TRANSFER",
            CallEventKind::StreamStart => "STREAM_START",
            CallEventKind::StreamStop => "STREAM_STOP",
            CallEventKind::StreamError => "STREAM_ERROR",
            CallEventKind::StreamClosed => "STREAM_CLOSED",
        }
    }
}

impl Serialize for CallEventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Append-only audit record for one call event
#[derive(Debug, Clone, Serialize)]
pub struct CallEvent {
    pub id: Uuid,
    pub call_sid: String,
    pub kind: CallEventKind,
    pub payload: serde_json::Value,
    pub ts: DateTime<Utc>,
}

impl CallEvent {
    pub fn new(kind: CallEventKind, payload: serde_json::Value, call_sid: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_sid: call_sid.into(),
            kind,
            payload,
            ts: Utc::now(),
        }
    }
}
