//! Canonical field record and fail-soft extraction
//!
//! The reasoning backend is asked to reply with a single JSON object. Replies
//! are untrusted: the extractor never errors, degrading any malformed or
//! missing input to an all-unknown record so the decision policy always
//! receives a well-formed value.

use crate::domain::lead::{Interest, LeadUpdate, OwnerStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The seven canonical fields produced per classification cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadFields {
    pub interest: Interest,
    pub price_range: String,
    pub timing: String,
    pub condition: String,
    pub owner_status: OwnerStatus,
    pub callback_window: String,
    pub notes: String,
}

impl LeadFields {
    /// Projection used for a merge-write against the lead row; callback
    /// window and notes are call-scoped and never stored on the lead itself
    pub fn to_lead_update(&self) -> LeadUpdate {
        LeadUpdate {
            interest: self.interest,
            price_range: self.price_range.clone(),
            timing: self.timing.clone(),
            condition: self.condition.clone(),
            owner_status: self.owner_status,
            ..LeadUpdate::default()
        }
    }
}

/// Extract the canonical field record from a raw backend text blob.
///
/// The blob is expected to contain one JSON object, possibly surrounded by
/// stray prose. Parse failure yields the all-unknown default.
pub fn extract_fields(raw: &str) -> LeadFields {
    let trimmed = raw.trim();

    let candidate = if trimmed.starts_with('{') {
        trimmed
    } else {
        // Tolerate prose around the object by slicing the outermost braces
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(start), Some(end)) if start < end => &trimmed[start..=end],
            _ => {
                debug!("backend output contained no JSON object");
                return LeadFields::default();
            }
        }
    };

    match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(value) => fields_from_value(&value),
        Err(e) => {
            debug!(error = %e, "backend output failed to parse, treating as unknown");
            LeadFields::default()
        }
    }
}

/// Extract the canonical field record from an already-structured payload,
/// e.g. realtime tool-call arguments. Never errors.
///
/// Each field defaults independently: a type-mismatched or missing value
/// degrades that one field, never the rest of the record.
pub fn fields_from_value(value: &serde_json::Value) -> LeadFields {
    let Some(map) = value.as_object() else {
        debug!("structured backend payload was not a JSON object");
        return LeadFields::default();
    };

    let text = |key: &str| {
        map.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    let enum_text = |key: &str| map.get(key).and_then(|v| v.as_str()).unwrap_or("");

    LeadFields {
        interest: Interest::from_str(enum_text("interest")),
        price_range: text("price_range"),
        timing: text("timing"),
        condition: text("condition"),
        owner_status: OwnerStatus::from_str(enum_text("owner_status")),
        callback_window: text("callback_window"),
        notes: text("notes"),
    }
}
