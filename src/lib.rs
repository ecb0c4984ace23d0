//! Leadline - automated phone qualification of real-estate seller leads
//!
//! A call session orchestrator: it greets a caller, classifies selling
//! intent turn by turn (or continuously over a streamed audio session),
//! collects a few structured facts, and deterministically routes the call to
//! a terminal outcome: warm transfer, scheduled callback, do-not-contact, or
//! timed exit.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;
