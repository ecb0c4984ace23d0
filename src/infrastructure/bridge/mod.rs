//! Media/reasoning session bridging

pub mod stream_bridge;

pub use stream_bridge::{DrainBounds, StreamBridge, TelephonyFrame};
