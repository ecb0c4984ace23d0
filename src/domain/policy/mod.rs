//! Decision policy
//!
//! Pure mapping from the latest classified field record and elapsed call time
//! to a terminal outcome or "continue". Callers apply the side effects the
//! returned decision names (mark qualified, create callback, log outcome).

use crate::domain::intent::LeadFields;
use crate::domain::lead::{Interest, DEFAULT_CALLBACK_WINDOW};
use serde::Serialize;

/// Reference timebox for the turn-based path, in seconds
pub const DEFAULT_TIMEBOX_SECS: u32 = 90;

/// Terminal disposition tag stored on a closed conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Dnc,
    Callback,
    Transfer,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Dnc => "dnc",
            Outcome::Callback => "callback",
            Outcome::Transfer => "transfer",
        }
    }
}

/// Why a do-not-contact exit fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DncReason {
    /// The caller said no / asked for removal
    StatedIntent,
    /// No branch matched within the timebox
    Timebox,
}

impl DncReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DncReason::StatedIntent => "stated_intent",
            DncReason::Timebox => "no_clear_interest_within_timebox",
        }
    }
}

/// Policy output for one classification cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Time remains and no branch matched; solicit another turn
    Continue,
    /// End the call and stop contacting this number
    Dnc { reason: DncReason, notes: String },
    /// Schedule a callback in the given window
    Callback { window: String, notes: String },
    /// Warm-transfer to a human; the caller must persist the qualified flag
    Transfer,
}

impl Decision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Decision::Continue)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Decision::Continue => None,
            Decision::Dnc { .. } => Some(Outcome::Dnc),
            Decision::Callback { .. } => Some(Outcome::Callback),
            Decision::Transfer => Some(Outcome::Transfer),
        }
    }
}

/// Evaluate the decision policy.
///
/// Branch order is significant: a stated "no" or removal request always wins,
/// then a callback request, then qualification-based transfer, then the
/// timebox fallback. Total over its input domain.
pub fn decide(fields: &LeadFields, elapsed_secs: u32, timebox_secs: u32) -> Decision {
    let price_ok = !fields.price_range.trim().is_empty();
    let time_ok = !fields.timing.trim().is_empty();

    match fields.interest {
        Interest::Dnc | Interest::No => Decision::Dnc {
            reason: DncReason::StatedIntent,
            notes: fields.notes.clone(),
        },
        Interest::Later => Decision::Callback {
            window: if fields.callback_window.trim().is_empty() {
                DEFAULT_CALLBACK_WINDOW.to_string()
            } else {
                fields.callback_window.clone()
            },
            notes: fields.notes.clone(),
        },
        Interest::Yes | Interest::Maybe
            if price_ok || time_ok || elapsed_secs >= timebox_secs =>
        {
            Decision::Transfer
        }
        _ if elapsed_secs >= timebox_secs => Decision::Dnc {
            reason: DncReason::Timebox,
            notes: String::new(),
        },
        _ => Decision::Continue,
    }
}
