//! Shared value objects used across multiple bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Telephony-provider call identifier (e.g. Twilio `CallSid`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallSid(String);

impl CallSid {
    pub fn new(sid: impl Into<String>) -> Self {
        Self(sid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CallSid {
    fn default() -> Self {
        Self(String::new())
    }
}

impl fmt::Display for CallSid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller phone number value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse a phone number, accepting E.164 or bare digits
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Phone number must not be empty".to_string());
        }

        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("Invalid phone number: {trimmed}"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_parse_e164() {
        let phone = PhoneNumber::parse("+15551230001").unwrap();
        assert_eq!(phone.as_str(), "+15551230001");
    }

    #[test]
    fn test_phone_number_parse_rejects_empty() {
        assert!(PhoneNumber::parse("").is_err());
        assert!(PhoneNumber::parse("   ").is_err());
    }

    #[test]
    fn test_phone_number_parse_rejects_letters() {
        assert!(PhoneNumber::parse("+1555CALLNOW").is_err());
    }

    #[test]
    fn test_call_sid_display() {
        let sid = CallSid::new("CA1234");
        assert_eq!(sid.to_string(), "CA1234");
        assert!(!sid.is_empty());
        assert!(CallSid::default().is_empty());
    }
}
