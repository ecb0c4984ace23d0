//! Offline conversation demo
//!
//! Replays four scripted calls through the turn orchestrator against the
//! in-memory store and the keyword-rule classifier, printing each step's
//! disposition. No network or database required.

use leadline::application::simulate_conversation;
use leadline::config::PolicyConfig;
use leadline::domain::lead::LeadRepository;
use leadline::infrastructure::llm::{RuleTurnBackend, TurnBackend};
use leadline::infrastructure::persistence::MemoryLeadRepository;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

const DEMO_CASES: &[(&str, &[&str])] = &[
    ("dnc", &["hello?", "i'm not selling, please remove me from your list"]),
    ("later", &["hi, who is this?", "call me later today after 5pm, i'm at work"]),
    (
        "qualified",
        &[
            "yeah i might consider an offer",
            "probably around 370k if it's straightforward",
            "timeline maybe 30 to 45 days, no big repairs",
        ],
    ),
    (
        "timeout_no_interest",
        &[
            "who is this?",
            "can't talk now",
            "not interested",
            "what company is this?",
            "why are you calling?",
            "i don't have time",
            "goodbye",
        ],
    ),
];

fn demo_phone(label: &str) -> String {
    let mut hasher = DefaultHasher::new();
    label.hash(&mut hasher);
    format!("+1555{:06}", hasher.finish() % 1_000_000)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store: Arc<dyn LeadRepository> = Arc::new(MemoryLeadRepository::new());
    let backend: Arc<dyn TurnBackend> = Arc::new(RuleTurnBackend);
    let policy = PolicyConfig::default();

    println!("=== Leadline Chatbot Demo ===");
    for (label, turns) in DEMO_CASES {
        let phone = demo_phone(label);
        println!("\n--- CASE: {label} ({phone}) ---");

        let utterances: Vec<String> = turns.iter().map(|t| t.to_string()).collect();
        // 15s per turn: seven turns cross the 90s timebox
        let results = simulate_conversation(
            store.clone(),
            backend.clone(),
            policy.clone(),
            &phone,
            &utterances,
            15,
        )
        .await?;

        for (step, result) in results.iter().enumerate() {
            println!("\nStep {}:", step + 1);
            println!(" disposition: {:?}", result.disposition);
            println!(" lead: {:?}", result.lead.as_ref().map(|l| (&l.interest, &l.price_range, l.qualified)));
            println!(" fields: {:?}", result.fields);
            println!(" elapsed: {}s", result.elapsed_secs);
        }
    }

    Ok(())
}
