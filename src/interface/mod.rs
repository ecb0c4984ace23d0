//! Interface layer - HTTP/WebSocket surface toward frontends and telephony

pub mod api;
