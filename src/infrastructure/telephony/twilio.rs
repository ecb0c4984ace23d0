//! Twilio REST adapter for live-call control
//!
//! `TelephonyControl` is the capability the bridge and handlers hold: start
//! an outbound call, or redirect a live call to the transfer markup. Keeping
//! it a port lets tests observe transfer actions through a fake.

use crate::config::TelephonyConfig;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::CallSid;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Imperative actions toward the telephony layer
#[async_trait]
pub trait TelephonyControl: Send + Sync {
    /// Initiate an outbound call to `to`, returning the provider call id
    async fn start_call(&self, to: &str) -> Result<CallSid>;

    /// Redirect a live call to the transfer markup document
    async fn redirect_to_transfer(&self, call_sid: &CallSid) -> Result<()>;
}

/// Twilio-backed implementation
pub struct TwilioControl {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    caller_id: String,
    public_base_url: String,
}

impl TwilioControl {
    pub fn new(config: &TelephonyConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            caller_id: config.caller_id.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }
}

#[async_trait]
impl TelephonyControl for TwilioControl {
    async fn start_call(&self, to: &str) -> Result<CallSid> {
        let url = format!("{TWILIO_API_BASE}/Accounts/{}/Calls.json", self.account_sid);
        let answer_url = format!("{}/twilio/voice/answer", self.public_base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.caller_id.as_str()), ("Url", answer_url.as_str())])
            .send()
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::TransportFault(format!(
                "call create returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))?;
        let sid = body
            .get("sid")
            .and_then(|v| v.as_str())
            .ok_or_else(|| DomainError::TransportFault("call create reply missing sid".to_string()))?;

        info!(to = %to, sid = %sid, "outbound call initiated");
        Ok(CallSid::new(sid))
    }

    async fn redirect_to_transfer(&self, call_sid: &CallSid) -> Result<()> {
        let url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Calls/{}.json",
            self.account_sid, call_sid
        );
        let transfer_url = format!("{}/twilio/voice/transfer", self.public_base_url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("Url", transfer_url.as_str()), ("Method", "POST")])
            .send()
            .await
            .map_err(|e| DomainError::TransportFault(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::TransportFault(format!(
                "call redirect returned {status}: {body}"
            )));
        }

        info!(sid = %call_sid, "live call redirected to transfer");
        Ok(())
    }
}

/// Stand-in used when no telephony credentials are configured; outbound calls
/// fail loudly, redirects are logged and dropped so offline runs still close
/// their calls cleanly.
pub struct NullTelephonyControl;

#[async_trait]
impl TelephonyControl for NullTelephonyControl {
    async fn start_call(&self, _to: &str) -> Result<CallSid> {
        Err(DomainError::Config(
            "telephony provider not configured".to_string(),
        ))
    }

    async fn redirect_to_transfer(&self, call_sid: &CallSid) -> Result<()> {
        warn!(sid = %call_sid, "telephony provider not configured, dropping transfer redirect");
        Ok(())
    }
}

/// Pick the configured control implementation
pub fn telephony_from_config(config: &TelephonyConfig) -> Arc<dyn TelephonyControl> {
    if config.account_sid.is_empty() || config.auth_token.is_empty() {
        warn!("telephony credentials missing, using null control");
        Arc::new(NullTelephonyControl)
    } else {
        Arc::new(TwilioControl::new(config))
    }
}
