//! Client types and configuration

use std::time::Duration;

use thiserror::Error;

/// Lifecycle state of a client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// The connection is open and usable
    Connected,
}

/// An opaque outbound or inbound payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
}

impl Message {
    /// Create a text message
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a binary message
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::Binary(data.into())
    }
}

/// Transport and client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WsError {
    /// Connection could not be established
    #[error("connection failed: {0}")]
    Open(String),
    /// A specific outbound message failed; the message is dropped, not retried
    #[error("send failed: {0}")]
    Send(String),
    /// The receive loop failed
    #[error("receive failed: {0}")]
    Receive(String),
    /// The transport terminated outside the normal send/receive path
    #[error("transport terminated: {0}")]
    Terminated(String),
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Reconnect automatically after a transport failure
    pub reconnect_on_failure: bool,
    /// Delay before the first reconnection attempt
    pub base_reconnect_delay: Duration,
    /// Cap on the delay between reconnection attempts
    pub max_reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            reconnect_on_failure: true,
            base_reconnect_delay: Duration::from_millis(250),
            max_reconnect_delay: Duration::from_secs(16),
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Enable or disable automatic reconnection after failures
    pub fn reconnect_on_failure(mut self, enabled: bool) -> Self {
        self.reconnect_on_failure = enabled;
        self
    }

    /// Set the delay before the first reconnection attempt
    pub fn base_delay(mut self, d: Duration) -> Self {
        self.base_reconnect_delay = d;
        self
    }

    /// Set the cap on the delay between reconnection attempts
    pub fn max_delay(mut self, d: Duration) -> Self {
        self.max_reconnect_delay = d;
        self
    }
}
