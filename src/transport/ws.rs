//! tokio-tungstenite transport

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{Transport, TransportSink, TransportStream};
use crate::client::{Message, WsError};

/// Type alias for a connected WebSocket stream
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default transport: TCP + TLS + WebSocket framing via tokio-tungstenite
#[derive(Debug, Clone, Default)]
pub struct WsTransport;

impl WsTransport {
    /// Create a new transport
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(
        &self,
        url: &str,
    ) -> Result<(Box<dyn TransportSink>, Box<dyn TransportStream>), WsError> {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| WsError::Open(e.to_string()))?;

        let (write, read) = ws_stream.split();
        Ok((Box::new(WsSink { write }), Box::new(WsRead { read })))
    }
}

struct WsSink {
    write: SplitSink<WsStream, Frame>,
}

#[async_trait]
impl TransportSink for WsSink {
    async fn send(&mut self, message: Message) -> Result<(), WsError> {
        let frame = match message {
            Message::Text(text) => Frame::Text(text),
            Message::Binary(data) => Frame::Binary(data),
        };
        self.write
            .send(frame)
            .await
            .map_err(|e| WsError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        // Sends a close frame and shuts the write half down. Best effort:
        // the connection may already be gone.
        let _ = self.write.close().await;
    }
}

struct WsRead {
    read: SplitStream<WsStream>,
}

#[async_trait]
impl TransportStream for WsRead {
    async fn recv(&mut self) -> Option<Result<Message, WsError>> {
        loop {
            match self.read.next().await {
                Some(Ok(Frame::Text(text))) => return Some(Ok(Message::Text(text))),
                Some(Ok(Frame::Binary(data))) => return Some(Ok(Message::Binary(data))),
                Some(Ok(Frame::Ping(_))) | Some(Ok(Frame::Pong(_))) => {
                    // Pong replies are handled by tungstenite itself
                    continue;
                }
                Some(Ok(Frame::Close(frame))) => {
                    match frame {
                        Some(frame) => {
                            tracing::info!(code = %frame.code, reason = %frame.reason, "Received close frame")
                        }
                        None => tracing::info!("Received close frame"),
                    }
                    return None;
                }
                Some(Ok(Frame::Frame(_))) => continue,
                Some(Err(e)) => return Some(Err(WsError::Receive(e.to_string()))),
                None => {
                    return Some(Err(WsError::Terminated(
                        "stream ended unexpectedly".into(),
                    )))
                }
            }
        }
    }
}
