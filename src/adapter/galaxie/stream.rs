//! Galaxie push channel over tokio-tungstenite.
//!
//! The connector opens one WebSocket per run. The stream maps messages to
//! [`PushFrame`]s and answers pings itself, so callers only ever see data
//! frames and the close.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::infrastructure::config::ApiConfig;
use crate::port::{PushConnector, PushFrame, PushStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections with a bounded handshake time.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    connect_timeout: Duration,
}

impl TungsteniteConnector {
    #[must_use]
    pub const fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    #[must_use]
    pub const fn from_config(config: &ApiConfig) -> Self {
        Self::new(Duration::from_millis(config.connect_timeout_ms))
    }
}

#[async_trait]
impl PushConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushStream>> {
        debug!(url = %url, "Connecting to WebSocket");
        let (ws, response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "WebSocket handshake timed out after {}ms",
                    self.connect_timeout.as_millis()
                ))
            })??;
        info!(url = %url, status = %response.status(), "WebSocket connected");
        Ok(Box::new(TungsteniteStream::new(ws)))
    }
}

/// An open push connection.
pub struct TungsteniteStream {
    ws: Socket,
}

impl TungsteniteStream {
    #[must_use]
    pub fn new(ws: Socket) -> Self {
        Self { ws }
    }
}

#[async_trait]
impl PushStream for TungsteniteStream {
    async fn next_frame(&mut self) -> Option<Result<PushFrame>> {
        loop {
            match self.ws.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(PushFrame::Text(text))),
                Ok(Message::Binary(data)) => return Some(Ok(PushFrame::Binary(data))),
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = self.ws.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(frame)) => {
                    return Some(Ok(PushFrame::Close(
                        frame.map(|f| f.reason.to_string()),
                    )));
                }
                // Pong and raw frames carry nothing for us.
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.ws.close(None).await {
            Ok(())
            | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
