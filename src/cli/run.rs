//! Run command implementation

use std::sync::Arc;

use clap::Args;

use crate::client::{Client, ConnectionState, Message, WsError};
use crate::config::Config;
use crate::observer::Observer;
use crate::transport::WsTransport;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the configured WebSocket URL
    #[arg(short, long)]
    pub url: Option<String>,

    /// Message to send once connected
    #[arg(short, long)]
    pub greeting: Option<String>,
}

/// Prints every callback; sends the greeting on each successful connect
struct PrintObserver {
    client: Client,
    greeting: Option<String>,
}

impl Observer for PrintObserver {
    fn on_message(&self, message: Message) {
        match message {
            Message::Text(text) => println!("received: {}", text),
            Message::Binary(data) => println!("received: {} bytes", data.len()),
        }
    }

    fn on_error(&self, error: Option<WsError>) {
        match error {
            Some(e) => eprintln!("error: {}", e),
            None => println!("message sent"),
        }
    }

    fn on_state_change(&self, state: ConnectionState) {
        println!("state: {:?}", state);
        if state == ConnectionState::Connected {
            if let Some(greeting) = &self.greeting {
                self.client.send(Message::text(greeting.clone()));
            }
        }
    }
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut client_config = config.connection.client_config();
        if let Some(url) = &self.url {
            client_config.url = url.clone();
        }

        tracing::info!(url = %client_config.url, "Starting client");

        let client = Client::new(client_config, WsTransport::new());
        let observer = Arc::new(PrintObserver {
            client: client.clone(),
            greeting: self.greeting.clone(),
        });
        client.set_observer(&observer);
        client.connect();

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutting down");
        client.disconnect();

        Ok(())
    }
}
