//! Connection state machine
//!
//! One task owns every piece of mutable client state. Caller commands and
//! transport events arrive over channels and are processed one at a time, so
//! `connect`, `disconnect`, `send`, and transport callbacks never interleave.
//! Spawned work (connection attempts, the receive loop, reconnect timers)
//! carries the epoch it was started under; events from a superseded epoch are
//! dropped, which makes cancellation race-free.

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::backoff::Backoff;
use crate::client::types::{ClientConfig, ConnectionState, Message, WsError};
use crate::observer::Observer;
use crate::queue::SendQueue;
use crate::transport::{Transport, TransportSink, TransportStream};

/// Caller-facing requests, serialized through the machine task
pub(crate) enum Command {
    Connect,
    Disconnect,
    Send(Message),
    SetObserver(Weak<dyn Observer>),
}

/// Transport and timer completions, re-submitted into the machine task
enum Event {
    Opened {
        epoch: u64,
        sink: Box<dyn TransportSink>,
        stream: Box<dyn TransportStream>,
    },
    OpenFailed {
        epoch: u64,
        error: WsError,
    },
    Inbound {
        epoch: u64,
        message: Message,
    },
    StreamFailed {
        epoch: u64,
        error: WsError,
    },
    PeerClosed {
        epoch: u64,
    },
    RetryElapsed {
        epoch: u64,
    },
}

/// Spawn the machine task for one client.
///
/// Returns the command channel and the state watch. The task runs until the
/// last command sender is dropped.
pub(crate) fn spawn(
    config: ClientConfig,
    transport: Arc<dyn Transport>,
) -> (
    mpsc::UnboundedSender<Command>,
    watch::Receiver<ConnectionState>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

    let machine = Machine {
        backoff: Backoff::new(config.base_reconnect_delay, config.max_reconnect_delay),
        config,
        transport,
        observer: None,
        queue: SendQueue::new(),
        sink: None,
        reader: None,
        retry_timer: None,
        retry_count: 0,
        epoch: 0,
        state_tx,
        events_tx: event_tx,
    };
    tokio::spawn(machine.run(command_rx, event_rx));

    (command_tx, state_rx)
}

struct Machine {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    backoff: Backoff,
    observer: Option<Weak<dyn Observer>>,
    queue: SendQueue,
    /// Write half of the live connection; Some only while `Connected`
    sink: Option<Box<dyn TransportSink>>,
    /// Receive loop of the live connection
    reader: Option<JoinHandle<()>>,
    /// Pending reconnect timer; at most one live at a time
    retry_timer: Option<JoinHandle<()>>,
    /// Consecutive failed attempts since the last successful open
    retry_count: u32,
    /// Invalidates events from superseded connection attempts and timers
    epoch: u64,
    state_tx: watch::Sender<ConnectionState>,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl Machine {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<Event>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Connect) => self.on_connect(),
                    Some(Command::Disconnect) => self.on_disconnect(),
                    Some(Command::Send(message)) => self.on_send(message).await,
                    Some(Command::SetObserver(observer)) => self.observer = Some(observer),
                    None => break,
                },
                Some(event) = events.recv() => self.on_event(event).await,
            }
        }
        self.shutdown();
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&mut self, next: ConnectionState) {
        let previous = self.state();
        if previous == next {
            return;
        }
        self.state_tx.send_replace(next);
        tracing::debug!(?previous, ?next, "Connection state changed");
        self.notify_state(next);
    }

    /// No-op unless currently `Disconnected`
    fn on_connect(&mut self) {
        if self.state() != ConnectionState::Disconnected {
            return;
        }
        self.cancel_retry();
        self.set_state(ConnectionState::Connecting);
        self.spawn_open();
    }

    /// Callable from any state; always settles into `Disconnected`
    fn on_disconnect(&mut self) {
        self.teardown();
    }

    async fn on_send(&mut self, message: Message) {
        if self.state() != ConnectionState::Connected {
            self.queue.push(message);
            tracing::debug!(queued = self.queue.len(), "Buffered message until connected");
            return;
        }
        self.send_now(message).await;
    }

    async fn on_event(&mut self, event: Event) {
        match event {
            Event::Opened {
                epoch,
                sink,
                stream,
            } => self.on_opened(epoch, sink, stream).await,
            Event::OpenFailed { epoch, error } => {
                if epoch == self.epoch {
                    self.handle_failure(error);
                }
            }
            Event::Inbound { epoch, message } => {
                if epoch == self.epoch {
                    self.notify_message(message);
                }
            }
            Event::StreamFailed { epoch, error } => {
                if epoch == self.epoch {
                    self.handle_failure(error);
                }
            }
            Event::PeerClosed { epoch } => {
                if epoch == self.epoch {
                    tracing::info!("Connection closed by peer");
                    self.teardown();
                }
            }
            Event::RetryElapsed { epoch } => {
                if epoch == self.epoch {
                    self.retry_timer = None;
                    self.retry_count += 1;
                    self.on_connect();
                }
            }
        }
    }

    async fn on_opened(
        &mut self,
        epoch: u64,
        sink: Box<dyn TransportSink>,
        stream: Box<dyn TransportStream>,
    ) {
        if epoch != self.epoch {
            // Superseded attempt; close the stray connection
            let mut sink = sink;
            tokio::spawn(async move { sink.close().await });
            return;
        }
        tracing::info!(url = %self.config.url, "WebSocket connected");
        self.sink = Some(sink);
        self.retry_count = 0;
        self.set_state(ConnectionState::Connected);
        self.spawn_reader(stream);
        self.flush_queue().await;
    }

    fn spawn_open(&mut self) {
        self.epoch += 1;
        let epoch = self.epoch;
        let url = self.config.url.clone();
        let transport = Arc::clone(&self.transport);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            match transport.open(&url).await {
                Ok((sink, stream)) => {
                    let _ = events.send(Event::Opened {
                        epoch,
                        sink,
                        stream,
                    });
                }
                Err(error) => {
                    let _ = events.send(Event::OpenFailed { epoch, error });
                }
            }
        });
    }

    /// Sequential receive loop: one outstanding receive at a time
    fn spawn_reader(&mut self, mut stream: Box<dyn TransportStream>) {
        let epoch = self.epoch;
        let events = self.events_tx.clone();
        self.reader = Some(tokio::spawn(async move {
            loop {
                match stream.recv().await {
                    Some(Ok(message)) => {
                        if events.send(Event::Inbound { epoch, message }).is_err() {
                            break;
                        }
                    }
                    Some(Err(error)) => {
                        let _ = events.send(Event::StreamFailed { epoch, error });
                        break;
                    }
                    None => {
                        let _ = events.send(Event::PeerClosed { epoch });
                        break;
                    }
                }
            }
        }));
    }

    /// Send through the live connection, reporting the outcome to the
    /// observer. A failed message is dropped; callers resend if they need
    /// at-least-once delivery.
    async fn send_now(&mut self, message: Message) {
        let result = match self.sink.as_mut() {
            Some(sink) => sink.send(message).await,
            None => return,
        };
        match result {
            Ok(()) => self.notify_error(None),
            Err(error) => self.handle_failure(error),
        }
    }

    /// Drain the queue in FIFO order through the normal send path. A
    /// mid-flush failure tears the connection down, leaving the remaining
    /// messages queued for the next successful connect.
    async fn flush_queue(&mut self) {
        while self.state() == ConnectionState::Connected {
            let Some(message) = self.queue.pop() else {
                break;
            };
            self.send_now(message).await;
        }
    }

    /// Failure path shared by open, send, receive, and termination errors:
    /// the observer hears about the error before the state teardown.
    fn handle_failure(&mut self, error: WsError) {
        tracing::warn!(error = %error, "Transport failure");
        self.notify_error(Some(error));
        self.teardown();
        if self.config.reconnect_on_failure {
            self.schedule_retry();
        }
    }

    /// Shared teardown for `disconnect()`, failures, and peer closes
    fn teardown(&mut self) {
        self.cancel_retry();
        self.epoch += 1;
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(mut sink) = self.sink.take() {
            tokio::spawn(async move { sink.close().await });
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn schedule_retry(&mut self) {
        let delay = self.backoff.delay(self.retry_count);
        let epoch = self.epoch;
        let events = self.events_tx.clone();
        tracing::debug!(
            retry = self.retry_count,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        self.retry_timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            let _ = events.send(Event::RetryElapsed { epoch });
        }));
    }

    /// Cancelled wins: the abort stops a sleeping timer, and the epoch guard
    /// drops a completion that already queued
    fn cancel_retry(&mut self) {
        if let Some(timer) = self.retry_timer.take() {
            timer.abort();
        }
    }

    fn shutdown(&mut self) {
        self.cancel_retry();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if let Some(mut sink) = self.sink.take() {
            tokio::spawn(async move { sink.close().await });
        }
    }

    fn notify_message(&self, message: Message) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.on_message(message);
        }
    }

    fn notify_error(&self, error: Option<WsError>) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.on_error(error);
        }
    }

    fn notify_state(&self, state: ConnectionState) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.on_state_change(state);
        }
    }
}
