//! Application layer - use cases orchestrating domain objects
//!
//! Coordinates the lead store, reasoning backend and decision policy for one
//! call at a time, and converts outcomes into caller-facing results.

pub mod orchestrator;
pub mod simulate;

pub use orchestrator::{Disposition, TurnOrchestrator, TurnResult};
pub use simulate::simulate_conversation;
