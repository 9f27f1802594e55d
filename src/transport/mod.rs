//! Transport seam
//!
//! The client core never touches sockets, TLS, or WebSocket framing. It
//! drives a [`Transport`] that opens connections and hands back a sink/stream
//! pair for one connection's lifetime. [`WsTransport`] is the default
//! implementation over tokio-tungstenite.

mod ws;

pub use ws::WsTransport;

use async_trait::async_trait;

use crate::client::{Message, WsError};

/// Write half of one connection
#[async_trait]
pub trait TransportSink: Send + 'static {
    /// Send one message.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Send`] when the message could not be transmitted.
    async fn send(&mut self, message: Message) -> Result<(), WsError>;

    /// Initiate a graceful close. No completion signal is required; the
    /// caller discards the sink afterwards.
    async fn close(&mut self);
}

/// Read half of one connection
#[async_trait]
pub trait TransportStream: Send + 'static {
    /// Receive the next message.
    ///
    /// Returns:
    /// - `Some(Ok(message))` when a complete message arrived
    /// - `Some(Err(e))` when receiving failed or the transport terminated
    ///   abnormally
    /// - `None` when the peer closed the connection cleanly
    ///
    /// One-shot: the caller re-issues after each completion, keeping at most
    /// one receive outstanding.
    async fn recv(&mut self) -> Option<Result<Message, WsError>>;
}

/// Connection factory injected into the client
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Open a connection to `url`, reporting exactly one of opened or error.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Open`] when the connection could not be
    /// established.
    async fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), WsError>;
}
