//! Telephony provider adapters

pub mod twilio;
pub mod twiml;

pub use twilio::{telephony_from_config, NullTelephonyControl, TelephonyControl, TwilioControl};
