//! Offline text-replay harness
//!
//! Feeds scripted utterances through the turn orchestrator with a fixed
//! per-turn duration, stopping at the first terminal outcome. Used by the
//! demo binary and the simulate endpoint; pairs with the rule-table backend
//! for fully offline runs.

use crate::application::orchestrator::{TurnOrchestrator, TurnResult};
use crate::config::PolicyConfig;
use crate::domain::lead::LeadRepository;
use crate::domain::shared::result::Result;
use crate::infrastructure::llm::TurnBackend;
use std::sync::Arc;

/// Synthetic call id for replayed conversations
fn simulated_call_sid(phone: &str) -> String {
    let tail: String = phone
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("SIM-{tail}")
}

/// Replay a scripted conversation, one orchestrator per call
pub async fn simulate_conversation(
    store: Arc<dyn LeadRepository>,
    backend: Arc<dyn TurnBackend>,
    policy: PolicyConfig,
    phone: &str,
    utterances: &[String],
    seconds_per_turn: u32,
) -> Result<Vec<TurnResult>> {
    let call_sid = simulated_call_sid(phone);
    let mut orchestrator =
        TurnOrchestrator::begin(phone, &call_sid, store, backend, policy).await?;

    let mut results = Vec::with_capacity(utterances.len());
    for text in utterances {
        let result = orchestrator.ingest_user_text(text, seconds_per_turn).await?;
        let terminal = result.disposition.is_terminal();
        results.push(result);
        if terminal {
            break;
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_call_sid_uses_phone_tail() {
        assert_eq!(simulated_call_sid("+15551230001"), "SIM-0001");
        assert_eq!(simulated_call_sid("123"), "SIM-123");
    }
}
