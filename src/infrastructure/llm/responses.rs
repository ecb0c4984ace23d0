//! Turn-based reasoning backend
//!
//! `TurnBackend` is the port the orchestrator talks to. The OpenAI Responses
//! implementation threads the `previous_response_id` continuation token; the
//! rule-table implementation is a deterministic offline substitute used when
//! no API key is configured.

use crate::config::BackendConfig;
use crate::domain::intent::rules::classify;
use crate::domain::session::{Role, TurnEntry};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Raw reply from one backend invocation
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    /// Continuation token for the next invocation, when the backend issues one
    pub response_id: Option<String>,
}

/// Request/response classifier port
#[async_trait]
pub trait TurnBackend: Send + Sync {
    async fn complete(
        &self,
        history: &[TurnEntry],
        instructions: &str,
        previous_response_id: Option<&str>,
    ) -> Result<TurnReply>;
}

/// OpenAI Responses API client
pub struct OpenAiTurnBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTurnBackend {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    /// The SDK-style `output_text` convenience field is not always present;
    /// fall back to walking the output message content.
    fn extract_output_text(body: &serde_json::Value) -> String {
        if let Some(text) = body.get("output_text").and_then(|v| v.as_str()) {
            return text.to_string();
        }

        let mut collected = String::new();
        if let Some(items) = body.get("output").and_then(|v| v.as_array()) {
            for item in items {
                if let Some(parts) = item.get("content").and_then(|v| v.as_array()) {
                    for part in parts {
                        if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                            collected.push_str(text);
                        }
                    }
                }
            }
        }
        collected
    }
}

#[async_trait]
impl TurnBackend for OpenAiTurnBackend {
    async fn complete(
        &self,
        history: &[TurnEntry],
        instructions: &str,
        previous_response_id: Option<&str>,
    ) -> Result<TurnReply> {
        let input: Vec<serde_json::Value> = history
            .iter()
            .map(|entry| {
                json!({
                    "role": match entry.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": entry.text,
                })
            })
            .collect();

        let mut request = json!({
            "model": self.model,
            "input": input,
            "instructions": instructions,
            "temperature": 0.3,
            "store": false,
        });
        if let Some(prev) = previous_response_id {
            request["previous_response_id"] = json!(prev);
        }

        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::BackendUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::BackendUnavailable(format!(
                "responses API returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| DomainError::MalformedBackendOutput(e.to_string()))?;

        let text = Self::extract_output_text(&body);
        let response_id = body
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        debug!(response_id = ?response_id, "responses API reply received");
        Ok(TurnReply { text, response_id })
    }
}

/// Deterministic offline substitute driven by the keyword rule table
pub struct RuleTurnBackend;

#[async_trait]
impl TurnBackend for RuleTurnBackend {
    async fn complete(
        &self,
        history: &[TurnEntry],
        _instructions: &str,
        _previous_response_id: Option<&str>,
    ) -> Result<TurnReply> {
        let latest = history
            .iter()
            .rev()
            .find(|entry| entry.role == Role::User)
            .map(|entry| entry.text.as_str())
            .unwrap_or("");

        let fields = classify(latest);
        let text = serde_json::to_string(&fields)
            .map_err(|e| DomainError::MalformedBackendOutput(e.to_string()))?;

        Ok(TurnReply {
            text,
            response_id: None,
        })
    }
}

/// Pick the configured backend, falling back to the rule table when no API
/// key is present so calls still progress offline.
pub fn turn_backend_from_config(config: &BackendConfig) -> Arc<dyn TurnBackend> {
    if config.api_key.is_empty() {
        warn!("no reasoning backend configured, using keyword-rule fallback classifier");
        Arc::new(RuleTurnBackend)
    } else {
        Arc::new(OpenAiTurnBackend::new(
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        ))
    }
}
