//! Configuration management
//!
//! One typed `Config` built at process start and passed by reference; no
//! process-wide singletons. Values come from defaults, an optional
//! `leadline.toml`, and `LEADLINE_*` environment overrides
//! (e.g. `LEADLINE_BACKEND__API_KEY`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub backend: BackendConfig,
    pub telephony: TelephonyConfig,
    pub policy: PolicyConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Empty means run against the in-memory store
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Empty means fall back to the deterministic rule classifier
    pub api_key: String,
    pub model: String,
    pub realtime_model: String,
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-5".to_string(),
            realtime_model: "gpt-4o-realtime-preview".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Outbound caller id (E.164)
    pub caller_id: String,
    /// Acquisitions lead number dialed on warm transfer
    pub transfer_number: String,
    /// Public HTTPS base the provider calls back into
    pub public_base_url: String,
}

impl TelephonyConfig {
    /// wss:// URL of the media-stream endpoint derived from the public base
    pub fn stream_url(&self) -> String {
        format!(
            "{}/twilio/stream/media",
            self.public_base_url.replacen("https", "wss", 1)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Decision timebox for the turn-based path, seconds
    pub timebox_secs: u32,
    /// Trailing history entries sent to the backend per turn
    pub history_window: usize,
    /// Elapsed-time increment assumed per turn when the caller supplies none
    pub default_turn_secs: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            timebox_secs: crate::domain::policy::DEFAULT_TIMEBOX_SECS,
            history_window: 6,
            default_turn_secs: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Bounded wait while draining reasoning events per media frame, ms
    pub drain_media_ms: u64,
    /// Bounded wait for the final flush at stream stop, ms
    pub drain_final_ms: u64,
    /// Greeting spoken before the media stream opens
    pub greeting: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            drain_media_ms: 20,
            drain_final_ms: 500,
            greeting: "Hi, this is Vanessa.".to_string(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then `leadline.toml` if present, then
    /// `LEADLINE_*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("leadline").required(false))
            .add_source(
                config::Environment::with_prefix("LEADLINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn drain_bounds(&self) -> crate::infrastructure::bridge::DrainBounds {
        crate::infrastructure::bridge::DrainBounds {
            media: std::time::Duration::from_millis(self.stream.drain_media_ms),
            finish: std::time::Duration::from_millis(self.stream.drain_final_ms),
        }
    }
}
