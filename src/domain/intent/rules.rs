//! Deterministic keyword-rule classifier
//!
//! Ordered, data-driven rule table mapping utterance keywords to a canonical
//! field record. This backs the offline fallback when no reasoning backend is
//! configured; first matching rule wins, so removal requests take precedence
//! over anything else the caller said.

use super::extractor::LeadFields;
use crate::domain::lead::{Interest, OwnerStatus};

/// One ordered classification rule: any keyword hit yields the canned record
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub patterns: &'static [&'static str],
    pub interest: Interest,
    pub price_range: &'static str,
    pub timing: &'static str,
    pub condition: &'static str,
    pub owner_status: OwnerStatus,
    pub callback_window: &'static str,
}

/// Rule order is significant: do-not-call phrasing is checked first
pub const RULES: &[KeywordRule] = &[
    KeywordRule {
        patterns: &["remove", "do not call", "not selling", "stop calling"],
        interest: Interest::Dnc,
        price_range: "",
        timing: "",
        condition: "",
        owner_status: OwnerStatus::Unknown,
        callback_window: "",
    },
    KeywordRule {
        patterns: &["later", "busy", "another time", "tomorrow"],
        interest: Interest::Later,
        price_range: "",
        timing: "",
        condition: "",
        owner_status: OwnerStatus::Unknown,
        callback_window: "today 4-6pm",
    },
    KeywordRule {
        patterns: &["yes", "maybe", "might sell", "consider"],
        interest: Interest::Maybe,
        price_range: "350-380k",
        timing: "30-60 days",
        condition: "needs paint",
        owner_status: OwnerStatus::Owner,
        callback_window: "",
    },
];

/// Classify a single utterance against the rule table.
///
/// Returns the all-unknown record when nothing matches, which converges the
/// call toward the timebox exit.
pub fn classify(utterance: &str) -> LeadFields {
    let lowered = utterance.to_lowercase();

    for rule in RULES {
        if rule.patterns.iter().any(|p| lowered.contains(p)) {
            return LeadFields {
                interest: rule.interest,
                price_range: rule.price_range.to_string(),
                timing: rule.timing.to_string(),
                condition: rule.condition.to_string(),
                owner_status: rule.owner_status,
                callback_window: rule.callback_window.to_string(),
                notes: String::new(),
            };
        }
    }

    LeadFields::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_phrasing_classifies_dnc() {
        assert_eq!(classify("i'm not selling, remove me").interest, Interest::Dnc);
        assert_eq!(classify("please STOP CALLING me").interest, Interest::Dnc);
    }

    #[test]
    fn test_dnc_wins_over_later_rule_order() {
        // "not selling ... later" must hit the dnc rule first
        let fields = classify("not selling, maybe call later");
        assert_eq!(fields.interest, Interest::Dnc);
    }

    #[test]
    fn test_later_carries_callback_window() {
        let fields = classify("call me later today after 5pm");
        assert_eq!(fields.interest, Interest::Later);
        assert!(!fields.callback_window.is_empty());
    }

    #[test]
    fn test_positive_phrasing_is_maybe_with_details() {
        let fields = classify("yeah i might sell if the price is right");
        assert_eq!(fields.interest, Interest::Maybe);
        assert!(!fields.price_range.is_empty());
        assert_eq!(fields.owner_status, OwnerStatus::Owner);
    }

    #[test]
    fn test_no_match_is_unknown() {
        assert_eq!(classify("who is this?"), LeadFields::default());
    }
}
