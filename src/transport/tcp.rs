// transport/tcp.rs
use super::{Connector, Inbound, MessageStream};
use crate::{error::TransportError, models::Endpoint};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

/// Longest accepted line, newline excluded. Longer lines are dropped.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Raw socket transport with one JSON object per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Stream = LineStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<LineStream, TransportError> {
        let socket = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
            .await
            .map_err(|e| TransportError::from_connect(endpoint, e))?;
        debug!(%endpoint, "TCP connection established");
        Ok(LineStream::new(socket))
    }
}

pub struct LineStream {
    reader: BufReader<TcpStream>,
    buf: Vec<u8>,
    discarding: bool,
}

impl LineStream {
    pub fn new(socket: TcpStream) -> Self {
        Self {
            reader: BufReader::new(socket),
            buf: Vec::new(),
            discarding: false,
        }
    }
}

#[async_trait]
impl MessageStream for LineStream {
    async fn recv(&mut self) -> Inbound {
        loop {
            self.buf.clear();
            let read = (&mut self.reader)
                .take(MAX_LINE_LEN as u64 + 1)
                .read_until(b'\n', &mut self.buf)
                .await;
            let n = match read {
                Ok(0) => return Inbound::Closed,
                Ok(n) => n,
                Err(e) => return Inbound::from_io(&e),
            };
            let terminated = self.buf.last() == Some(&b'\n');

            if self.discarding {
                // Still inside an oversized line.
                self.discarding = !terminated;
                continue;
            }
            if !terminated && n > MAX_LINE_LEN {
                self.discarding = true;
                return Inbound::Fault(format!("line exceeds {MAX_LINE_LEN} bytes"));
            }

            match std::str::from_utf8(&self.buf) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Inbound::Message(line.to_string());
                }
                Err(e) => return Inbound::Fault(format!("invalid UTF-8 in frame: {e}")),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.reader.get_mut().shutdown().await?;
        Ok(())
    }
}
