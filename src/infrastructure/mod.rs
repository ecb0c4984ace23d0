//! Infrastructure layer - adapters for persistence, backends and telephony

pub mod bridge;
pub mod llm;
pub mod persistence;
pub mod telephony;
