//! Public client handle

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch};

use super::machine::{self, Command};
use super::types::{ClientConfig, ConnectionState, Message};
use crate::observer::Observer;
use crate::transport::{Transport, WsTransport};

/// Handle to a reconnecting WebSocket client.
///
/// Cheap to clone; every clone drives the same connection. Construction
/// spawns the client task, so it must happen inside a tokio runtime. When the
/// last handle is dropped the task stops: any pending reconnect timer is
/// cancelled and the connection is closed.
///
/// All methods are fire-and-forget; outcomes are delivered through the
/// registered [`Observer`].
#[derive(Clone)]
pub struct Client {
    url: String,
    commands: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl Client {
    /// Create a client over the given transport
    pub fn new(config: ClientConfig, transport: impl Transport) -> Self {
        let url = config.url.clone();
        let (commands, state_rx) = machine::spawn(config, Arc::new(transport));
        Self {
            url,
            commands,
            state_rx,
        }
    }

    /// Create a client for `url` with the default transport and config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(ClientConfig::new(url), WsTransport::new())
    }

    /// Start connecting. No-op unless currently disconnected.
    pub fn connect(&self) {
        let _ = self.commands.send(Command::Connect);
    }

    /// Close the connection and cancel any pending reconnect. Callable from
    /// any state.
    pub fn disconnect(&self) {
        let _ = self.commands.send(Command::Disconnect);
    }

    /// Send a message, or buffer it until the next successful connect when
    /// not currently connected
    pub fn send(&self, message: Message) {
        let _ = self.commands.send(Command::Send(message));
    }

    /// Register the observer. Held weakly: the client never extends the
    /// observer's lifetime, and delivery after the observer is dropped is a
    /// silent no-op.
    pub fn set_observer<O>(&self, observer: &Arc<O>)
    where
        O: Observer + 'static,
    {
        let observer: Arc<dyn Observer> = observer.clone();
        let weak: Weak<dyn Observer> = Arc::downgrade(&observer);
        let _ = self.commands.send(Command::SetObserver(weak));
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// The configured URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("state", &self.state())
            .finish()
    }
}
