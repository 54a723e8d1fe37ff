// transport/ws.rs
use super::{Connector, Inbound, MessageStream};
use crate::{error::TransportError, models::Endpoint};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message, error::ProtocolError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

/// Websocket client transport with one JSON object per text message.
#[derive(Debug, Clone)]
pub struct WsConnector {
    path: String,
}

impl WsConnector {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self { path }
    }

    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!("ws://{}:{}{}", endpoint.host, endpoint.port, self.path)
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new("/")
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Stream = WsStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<WsStream, TransportError> {
        let url = self.url(endpoint);
        match connect_async(url.as_str()).await {
            Ok((inner, response)) => {
                debug!(%endpoint, %url, status = %response.status(), "WebSocket handshake complete");
                Ok(WsStream { inner })
            }
            Err(tungstenite::Error::Io(e)) => Err(TransportError::from_connect(endpoint, e)),
            Err(e) => Err(TransportError::Handshake {
                endpoint: endpoint.clone(),
                source: Box::new(e),
            }),
        }
    }
}

pub struct WsStream {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl MessageStream for WsStream {
    async fn recv(&mut self) -> Inbound {
        loop {
            match self.inner.next().await {
                None => return Inbound::Closed,
                Some(Ok(Message::Text(text))) => {
                    let text = text.as_str().trim();
                    if text.is_empty() {
                        continue;
                    }
                    return Inbound::Message(text.to_string());
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    return Inbound::Closed;
                }
                Some(Ok(other)) => {
                    debug!(len = other.len(), "Skipping non-text frame");
                }
                Some(Err(e)) => return classify(e),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        match self.inner.close(None).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn classify(error: tungstenite::Error) -> Inbound {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => Inbound::Closed,
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => Inbound::Reset,
        tungstenite::Error::Io(e) => Inbound::from_io(&e),
        other => Inbound::Fault(other.to_string()),
    }
}
