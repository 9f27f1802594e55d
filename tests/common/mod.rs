//! Shared test fixtures: a scriptable in-memory transport and a recording
//! observer.
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use ws_tether::client::{ConnectionState, Message, WsError};
use ws_tether::observer::Observer;
use ws_tether::transport::{Transport, TransportSink, TransportStream};

/// One notification recorded by the observer
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    Message(Message),
    Error(Option<WsError>),
    State(ConnectionState),
}

pub struct RecordingObserver {
    tx: mpsc::UnboundedSender<Observed>,
}

impl RecordingObserver {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Observed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl Observer for RecordingObserver {
    fn on_message(&self, message: Message) {
        let _ = self.tx.send(Observed::Message(message));
    }

    fn on_error(&self, error: Option<WsError>) {
        let _ = self.tx.send(Observed::Error(error));
    }

    fn on_state_change(&self, state: ConnectionState) {
        let _ = self.tx.send(Observed::State(state));
    }
}

/// Await the next recorded notification
pub async fn next_observed(rx: &mut mpsc::UnboundedReceiver<Observed>) -> Observed {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for observer event")
        .expect("observer channel closed")
}

/// True when no notification arrives within `wait`
pub async fn no_observed_within(
    rx: &mut mpsc::UnboundedReceiver<Observed>,
    wait: Duration,
) -> bool {
    timeout(wait, rx.recv()).await.is_err()
}

enum StreamItem {
    Message(Message),
    Error(WsError),
    Closed,
}

struct Shared {
    open_count: AtomicUsize,
    open_failures: Mutex<VecDeque<WsError>>,
    send_failures: Mutex<HashSet<String>>,
    conns: mpsc::UnboundedSender<MockConn>,
}

/// Transport double: every successful open yields a [`MockConn`] the test
/// can script
pub struct MockTransport {
    shared: Arc<Shared>,
}

/// Test-side controller for a [`MockTransport`]
pub struct MockController {
    shared: Arc<Shared>,
    conns: mpsc::UnboundedReceiver<MockConn>,
}

/// Test-side handle to one accepted connection
pub struct MockConn {
    inbound: mpsc::UnboundedSender<StreamItem>,
    sent: mpsc::UnboundedReceiver<Message>,
}

pub fn mock_transport() -> (MockTransport, MockController) {
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        open_count: AtomicUsize::new(0),
        open_failures: Mutex::new(VecDeque::new()),
        send_failures: Mutex::new(HashSet::new()),
        conns: conn_tx,
    });
    (
        MockTransport {
            shared: shared.clone(),
        },
        MockController {
            shared,
            conns: conn_rx,
        },
    )
}

impl MockController {
    pub fn open_count(&self) -> usize {
        self.shared.open_count.load(Ordering::SeqCst)
    }

    /// Make the next open attempt fail
    pub fn fail_next_open(&self) {
        self.shared
            .open_failures
            .lock()
            .unwrap()
            .push_back(WsError::Open("scripted open failure".into()));
    }

    /// Make every send of this exact text payload fail
    pub fn fail_send(&self, text: &str) {
        self.shared
            .send_failures
            .lock()
            .unwrap()
            .insert(text.to_string());
    }

    /// Wait for the client's next connection to come up
    pub async fn next_conn(&mut self) -> MockConn {
        timeout(Duration::from_secs(5), self.conns.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("transport dropped")
    }

    /// True when no new connection comes up within `wait`
    pub async fn no_conn_within(&mut self, wait: Duration) -> bool {
        timeout(wait, self.conns.recv()).await.is_err()
    }
}

impl MockConn {
    /// Deliver an inbound text message to the client
    pub fn push_text(&self, text: &str) {
        let _ = self.inbound.send(StreamItem::Message(Message::text(text)));
    }

    /// Fail the client's receive loop
    pub fn fail_stream(&self, error: WsError) {
        let _ = self.inbound.send(StreamItem::Error(error));
    }

    /// Close the connection the way a peer would, cleanly
    pub fn close_clean(&self) {
        let _ = self.inbound.send(StreamItem::Closed);
    }

    /// Next message the client sent over this connection
    pub async fn next_sent(&mut self) -> Message {
        timeout(Duration::from_secs(5), self.sent.recv())
            .await
            .expect("timed out waiting for a sent message")
            .expect("connection dropped")
    }

    /// True when the client sends nothing within `wait`
    pub async fn no_sent_within(&mut self, wait: Duration) -> bool {
        // A real message is `Ok(Some(_))`; a timeout (`Err`) or a closed
        // channel (`Ok(None)`, once the connection's sink is dropped) both
        // mean nothing was sent.
        !matches!(timeout(wait, self.sent.recv()).await, Ok(Some(_)))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(
        &self,
        _url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), WsError> {
        self.shared.open_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.shared.open_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let _ = self.shared.conns.send(MockConn {
            inbound: inbound_tx,
            sent: sent_rx,
        });
        Ok((
            Box::new(MockSink {
                shared: self.shared.clone(),
                sent: sent_tx,
            }),
            Box::new(MockStream {
                inbound: inbound_rx,
            }),
        ))
    }
}

struct MockSink {
    shared: Arc<Shared>,
    sent: mpsc::UnboundedSender<Message>,
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, message: Message) -> Result<(), WsError> {
        if let Message::Text(text) = &message {
            if self.shared.send_failures.lock().unwrap().contains(text) {
                return Err(WsError::Send("scripted send failure".into()));
            }
        }
        let _ = self.sent.send(message);
        Ok(())
    }

    async fn close(&mut self) {}
}

struct MockStream {
    inbound: mpsc::UnboundedReceiver<StreamItem>,
}

#[async_trait]
impl TransportStream for MockStream {
    async fn recv(&mut self) -> Option<Result<Message, WsError>> {
        match self.inbound.recv().await {
            Some(StreamItem::Message(message)) => Some(Ok(message)),
            Some(StreamItem::Error(error)) => Some(Err(error)),
            Some(StreamItem::Closed) => None,
            // Scripting handle dropped; keep the connection quiet rather
            // than fabricating a close
            None => std::future::pending().await,
        }
    }
}
