//! Reconnecting WebSocket client
//!
//! Provides the connection-lifecycle state machine: automatic reconnection
//! with exponential backoff, outbound buffering while disconnected, and
//! observer-based event delivery.

mod handle;
mod machine;
mod types;

pub use handle::Client;
pub use types::{ClientConfig, ConnectionState, Message, WsError};
