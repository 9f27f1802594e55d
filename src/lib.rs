//! ws-tether: reconnecting WebSocket client
//!
//! This library provides the core components for:
//! - Connection lifecycle management (disconnected/connecting/connected)
//! - Automatic reconnection with exponential backoff
//! - Outbound message buffering while disconnected, flushed in order
//! - Observer-based delivery of messages, errors, and state changes
//! - A pluggable transport seam with a tokio-tungstenite default

pub mod backoff;
pub mod cli;
pub mod client;
pub mod config;
pub mod observer;
pub mod queue;
pub mod telemetry;
pub mod transport;
