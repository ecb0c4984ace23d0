//! In-memory lead store
//!
//! Backs the offline replay harness and tests, and serves as the fallback
//! when no database is configured. Same merge-on-write semantics as the
//! Postgres adapter; both go through `Lead::merge`.

use crate::domain::lead::{
    Callback, CallEvent, CallEventKind, Lead, LeadRepository, LeadUpdate, DEFAULT_CALLBACK_WINDOW,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryLeadRepository {
    leads: RwLock<HashMap<String, Lead>>,
    callbacks: RwLock<Vec<Callback>>,
    events: RwLock<Vec<CallEvent>>,
    next_lead_id: AtomicI64,
    next_callback_id: AtomicI64,
}

impl MemoryLeadRepository {
    pub fn new() -> Self {
        Self {
            next_lead_id: AtomicI64::new(1),
            next_callback_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Snapshot of recorded audit events, for assertions and dashboards
    pub async fn events(&self) -> Vec<CallEvent> {
        self.events.read().await.clone()
    }

    pub async fn events_of_kind(&self, kind: CallEventKind) -> Vec<CallEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    /// Snapshot of created callbacks
    pub async fn callbacks(&self) -> Vec<Callback> {
        self.callbacks.read().await.clone()
    }
}

#[async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        Ok(self.leads.read().await.get(phone).cloned())
    }

    async fn upsert(&self, phone: &str, update: &LeadUpdate) -> Result<Lead> {
        let mut leads = self.leads.write().await;
        let lead = leads.entry(phone.to_string()).or_insert_with(|| {
            let id = self.next_lead_id.fetch_add(1, Ordering::SeqCst);
            Lead::new(id, phone)
        });
        lead.merge(update);
        Ok(lead.clone())
    }

    async fn mark_qualified(&self, lead_id: i64, qualified: bool) -> Result<()> {
        let mut leads = self.leads.write().await;
        let lead = leads
            .values_mut()
            .find(|lead| lead.id == lead_id)
            .ok_or_else(|| DomainError::NotFound(format!("lead {lead_id}")))?;
        lead.qualified = qualified;
        lead.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn create_callback(&self, lead_id: i64, window: &str, notes: &str) -> Result<Callback> {
        let window = if window.trim().is_empty() {
            DEFAULT_CALLBACK_WINDOW
        } else {
            window
        };

        let callback = Callback {
            id: self.next_callback_id.fetch_add(1, Ordering::SeqCst),
            lead_id,
            window: window.to_string(),
            notes: notes.to_string(),
            created_at: chrono::Utc::now(),
        };
        self.callbacks.write().await.push(callback.clone());
        Ok(callback)
    }

    async fn append_event(
        &self,
        kind: CallEventKind,
        payload: serde_json::Value,
        call_sid: &str,
    ) -> Result<()> {
        self.events
            .write()
            .await
            .push(CallEvent::new(kind, payload, call_sid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lead::Interest;

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let repo = MemoryLeadRepository::new();

        let lead = repo
            .upsert("+15551230001", &LeadUpdate::default())
            .await
            .unwrap();
        assert_eq!(lead.interest, Interest::Unknown);

        let lead = repo
            .upsert(
                "+15551230001",
                &LeadUpdate {
                    interest: Interest::Maybe,
                    price_range: "350-380k".to_string(),
                    ..LeadUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(lead.id, 1);
        assert_eq!(lead.price_range, "350-380k");

        // Read-your-writes
        let found = repo.find_by_phone("+15551230001").await.unwrap().unwrap();
        assert_eq!(found.interest, Interest::Maybe);
    }

    #[tokio::test]
    async fn test_callback_window_defaults_when_empty() {
        let repo = MemoryLeadRepository::new();
        let lead = repo.upsert("+15551230002", &LeadUpdate::default()).await.unwrap();

        let cb = repo.create_callback(lead.id, "  ", "notes").await.unwrap();
        assert_eq!(cb.window, DEFAULT_CALLBACK_WINDOW);

        let cb = repo.create_callback(lead.id, "today 4-6pm", "").await.unwrap();
        assert_eq!(cb.window, "today 4-6pm");
    }

    #[tokio::test]
    async fn test_mark_qualified_unknown_lead_errors() {
        let repo = MemoryLeadRepository::new();
        assert!(repo.mark_qualified(99, true).await.is_err());
    }
}
