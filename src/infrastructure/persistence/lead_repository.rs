//! PostgreSQL implementation of the lead store

use crate::domain::lead::{
    Callback, CallEvent, CallEventKind, Interest, Lead, LeadRepository, LeadUpdate, OwnerStatus,
    DEFAULT_CALLBACK_WINDOW,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::debug;

#[derive(FromRow)]
struct LeadRow {
    id: i64,
    phone: String,
    owner_name: String,
    property_address: String,
    interest: String,
    price_range: String,
    timing: String,
    condition: String,
    owner_status: String,
    qualified: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<LeadRow> for Lead {
    fn from(r: LeadRow) -> Self {
        Lead {
            id: r.id,
            phone: r.phone,
            owner_name: r.owner_name,
            property_address: r.property_address,
            interest: Interest::from_str(&r.interest),
            price_range: r.price_range,
            timing: r.timing,
            condition: r.condition,
            owner_status: OwnerStatus::from_str(&r.owner_status),
            qualified: r.qualified,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CallbackRow {
    id: i64,
    lead_id: i64,
    window_txt: String,
    notes: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CallbackRow> for Callback {
    fn from(r: CallbackRow) -> Self {
        Callback {
            id: r.id,
            lead_id: r.lead_id,
            window: r.window_txt,
            notes: r.notes,
            created_at: r.created_at,
        }
    }
}

pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(
            "SELECT id, phone, owner_name, property_address, interest, price_range, \
             timing, condition, owner_status, qualified, created_at, updated_at \
             FROM leads WHERE phone = $1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;

        Ok(row.map(Lead::from))
    }
}

#[async_trait]
impl LeadRepository for PgLeadRepository {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Lead>> {
        self.fetch_by_phone(phone).await
    }

    async fn upsert(&self, phone: &str, update: &LeadUpdate) -> Result<Lead> {
        debug!(phone = %phone, "merge-writing lead");

        // Ensure the row exists, then merge in domain code and write back.
        sqlx::query("INSERT INTO leads (phone) VALUES ($1) ON CONFLICT (phone) DO NOTHING")
            .bind(phone)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        let mut lead = self
            .fetch_by_phone(phone)
            .await?
            .ok_or_else(|| DomainError::Store(format!("lead row missing for {phone}")))?;
        lead.merge(update);

        sqlx::query(
            "UPDATE leads SET owner_name = $1, property_address = $2, interest = $3, \
             price_range = $4, timing = $5, condition = $6, owner_status = $7, \
             updated_at = $8 WHERE id = $9",
        )
        .bind(&lead.owner_name)
        .bind(&lead.property_address)
        .bind(lead.interest.as_str())
        .bind(&lead.price_range)
        .bind(&lead.timing)
        .bind(&lead.condition)
        .bind(lead.owner_status.as_str())
        .bind(lead.updated_at)
        .bind(lead.id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;

        Ok(lead)
    }

    async fn mark_qualified(&self, lead_id: i64, qualified: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE leads SET qualified = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(qualified)
        .bind(lead_id)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("lead {lead_id}")));
        }
        Ok(())
    }

    async fn create_callback(&self, lead_id: i64, window: &str, notes: &str) -> Result<Callback> {
        let window = if window.trim().is_empty() {
            DEFAULT_CALLBACK_WINDOW
        } else {
            window
        };

        let row = sqlx::query_as::<_, CallbackRow>(
            "INSERT INTO callbacks (lead_id, window_txt, notes) VALUES ($1, $2, $3) \
             RETURNING id, lead_id, window_txt, notes, created_at",
        )
        .bind(lead_id)
        .bind(window)
        .bind(notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Store(e.to_string()))?;

        Ok(Callback::from(row))
    }

    async fn append_event(
        &self,
        kind: CallEventKind,
        payload: serde_json::Value,
        call_sid: &str,
    ) -> Result<()> {
        let event = CallEvent::new(kind, payload, call_sid);

        sqlx::query("INSERT INTO call_events (id, call_sid, kind, payload, ts) VALUES ($1, $2, $3, $4, $5)")
            .bind(event.id)
            .bind(&event.call_sid)
            .bind(event.kind.as_str())
            .bind(event.payload.to_string())
            .bind(event.ts)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;

        Ok(())
    }
}
