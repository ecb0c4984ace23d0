//! Lead store interface

use crate::domain::lead::entity::{Callback, CallEventKind, Lead, LeadUpdate};
use crate::domain::shared::result::Result;
use async_trait::async_trait;

/// Repository interface for leads, callbacks and the audit log
///
/// This is defined in the domain layer as a trait (port),
/// and implemented in the infrastructure layer (adapter).
///
/// Every operation is independently atomic. A merge-write followed by a
/// read-back within the same orchestrator step observes the write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Find a lead by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>>;

    /// Insert or merge-write a lead (non-empty fields overwrite, empty fields
    /// never erase prior values) and return the refreshed row
    async fn upsert(&self, phone: &str, update: &LeadUpdate) -> Result<Lead>;

    /// Set the qualified flag on a lead
    async fn mark_qualified(&self, lead_id: i64, qualified: bool) -> Result<()>;

    /// Create an immutable callback record; an empty window falls back to
    /// the default callback window
    async fn create_callback(&self, lead_id: i64, window: &str, notes: &str) -> Result<Callback>;

    /// Append one audit event to the call log (write-only)
    async fn append_event(
        &self,
        kind: CallEventKind,
        payload: serde_json::Value,
        call_sid: &str,
    ) -> Result<()>;
}
