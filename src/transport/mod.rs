// transport/mod.rs
//! Connectors and the message streams they yield.
//!
//! A stream hands the dispatcher one [`Inbound`] per read; transport
//! conditions are values, never panics or early returns.

mod tcp;
mod ws;

pub use tcp::{LineStream, TcpConnector};
pub use ws::{WsConnector, WsStream};

use crate::{error::TransportError, models::Endpoint};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use uuid::Uuid;

/// Result of a single read from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// One framed text unit.
    Message(String),
    /// The peer closed the stream cleanly.
    Closed,
    /// The peer dropped the connection without closing it.
    Reset,
    /// Any other read failure. The stream may still be usable.
    Fault(String),
}

impl Inbound {
    pub(crate) fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionAborted => Inbound::Reset,
            io::ErrorKind::UnexpectedEof => Inbound::Closed,
            _ => Inbound::Fault(error.to_string()),
        }
    }
}

#[async_trait]
pub trait MessageStream: Send {
    async fn recv(&mut self) -> Inbound;

    /// Flushes and closes the stream.
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: MessageStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Stream, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
    Reset,
}

/// A live stream plus the bookkeeping needed to log its lifetime.
pub struct Connection<S> {
    pub id: Uuid,
    pub endpoint: Endpoint,
    pub established_at: DateTime<Utc>,
    pub stream: S,
}

impl<S: MessageStream> Connection<S> {
    pub fn new(endpoint: Endpoint, stream: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            endpoint,
            established_at: Utc::now(),
            stream,
        }
    }
}
