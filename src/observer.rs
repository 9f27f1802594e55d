//! Observer contract
//!
//! The registered recipient of state-change, message, and error
//! notifications. The client holds the observer weakly: if the observer is
//! dropped, delivery becomes a silent no-op.

use crate::client::{ConnectionState, Message, WsError};

/// Recipient of client notifications.
///
/// All three methods are invoked from the client's internal task, one at a
/// time, in the order the causing events occurred. A failure is always
/// delivered via [`on_error`](Observer::on_error) before the `Disconnected`
/// state change it triggers. Implementations should return quickly; blocking
/// here stalls the client.
pub trait Observer: Send + Sync {
    /// An inbound message arrived while connected
    fn on_message(&self, message: Message);

    /// `Some` when a send or transport operation failed; `None` after a
    /// successful send, as an explicit sent-OK signal
    fn on_error(&self, error: Option<WsError>);

    /// The connection state changed (never fired for a same-state re-entry)
    fn on_state_change(&self, state: ConnectionState);
}
