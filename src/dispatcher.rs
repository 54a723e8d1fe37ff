// dispatcher.rs
//! The read loop: pulls units off the active stream, applies them to the
//! lamp, and reacts to transport conditions.

use crate::{
    commands,
    devices::SmartLamp,
    error::LampError,
    events::{EventSink, LampEvent},
    models::{DeviceState, Endpoint},
    transport::{Connection, ConnectionState, Connector, Inbound, MessageStream},
    utils,
};
use std::future::Future;
use tokio::sync::watch;

pub const DEFAULT_FAULT_LIMIT: u32 = 16;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The peer closed the stream.
    Closed,
    /// Shutdown was requested.
    Cancelled,
    /// Recovery was attempted and did not succeed.
    Failed { reason: String },
}

pub struct Dispatcher<C, S> {
    endpoint: Endpoint,
    connector: C,
    sink: S,
    lamp: SmartLamp,
    connection_state: ConnectionState,
    snapshots: watch::Sender<DeviceState>,
    fault_limit: u32,
}

impl<C, S> Dispatcher<C, S>
where
    C: Connector,
    S: EventSink,
{
    pub fn new(endpoint: Endpoint, connector: C, sink: S) -> Self {
        let lamp = SmartLamp::new();
        let (snapshots, _) = watch::channel(lamp.state().clone());
        Self {
            endpoint,
            connector,
            sink,
            lamp,
            connection_state: ConnectionState::Disconnected,
            snapshots,
            fault_limit: DEFAULT_FAULT_LIMIT,
        }
    }

    /// Consecutive stream faults tolerated before giving up. Minimum 1.
    pub fn with_fault_limit(mut self, limit: u32) -> Self {
        self.fault_limit = limit.max(1);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> &DeviceState {
        self.lamp.state()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Receiver that always holds the latest device state.
    pub fn subscribe(&self) -> watch::Receiver<DeviceState> {
        self.snapshots.subscribe()
    }

    /// Decodes, validates and applies one text unit. Never fails: rejected
    /// units come back as [`LampEvent::Rejected`] with the state untouched.
    pub fn dispatch(&mut self, text: &str) -> LampEvent {
        let event = match commands::decode(text) {
            Ok(command) => self.lamp.handle_command(command),
            Err(e) => LampEvent::Rejected(e),
        };

        if event.is_state_change() {
            let state = self.lamp.state();
            self.snapshots.send_if_modified(|current| {
                if current == state {
                    return false;
                }
                *current = state.clone();
                true
            });
        }

        self.sink.emit(&event);
        event
    }

    /// Connects and runs the read loop until the peer closes, `shutdown`
    /// resolves, or recovery fails. Only the initial connect returns `Err`.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<Termination, LampError>
    where
        F: Future<Output = ()>,
    {
        let mut connection = match self.connect().await {
            Ok(connection) => connection,
            Err(e) => return Err(LampError::Connect(e)),
        };

        tokio::pin!(shutdown);
        let mut faults = 0u32;

        loop {
            let inbound = tokio::select! {
                () = &mut shutdown => None,
                inbound = connection.stream.recv() => Some(inbound),
            };

            let Some(inbound) = inbound else {
                self.sink.emit(&LampEvent::ShuttingDown {
                    endpoint: self.endpoint.clone(),
                });
                utils::release_connection(connection, &mut self.sink).await;
                self.connection_state = ConnectionState::Disconnected;
                return Ok(Termination::Cancelled);
            };

            match inbound {
                Inbound::Message(text) => {
                    faults = 0;
                    self.dispatch(&text);
                }
                Inbound::Closed => {
                    self.connection_state = ConnectionState::Closed;
                    self.sink.emit(&LampEvent::PeerClosed {
                        endpoint: self.endpoint.clone(),
                    });
                    utils::release_connection(connection, &mut self.sink).await;
                    return Ok(Termination::Closed);
                }
                Inbound::Reset => {
                    self.connection_state = ConnectionState::Reset;
                    self.sink.emit(&LampEvent::PeerReset {
                        endpoint: self.endpoint.clone(),
                    });
                    drop(connection);
                    faults = 0;
                    connection = match self.connect().await {
                        Ok(connection) => connection,
                        Err(e) => {
                            return Ok(Termination::Failed {
                                reason: e.to_string(),
                            });
                        }
                    };
                }
                Inbound::Fault(detail) => {
                    faults += 1;
                    self.sink.emit(&LampEvent::StreamFault {
                        endpoint: self.endpoint.clone(),
                        detail,
                    });
                    if faults >= self.fault_limit {
                        self.sink.emit(&LampEvent::FaultLimitReached {
                            endpoint: self.endpoint.clone(),
                            faults,
                        });
                        utils::release_connection(connection, &mut self.sink).await;
                        self.connection_state = ConnectionState::Disconnected;
                        return Ok(Termination::Failed {
                            reason: format!("{faults} consecutive stream errors"),
                        });
                    }
                }
            }
        }
    }

    async fn connect(&mut self) -> Result<Connection<C::Stream>, crate::error::TransportError> {
        self.connection_state = ConnectionState::Connecting;
        match self.connector.connect(&self.endpoint).await {
            Ok(stream) => {
                let connection = Connection::new(self.endpoint.clone(), stream);
                self.connection_state = ConnectionState::Connected;
                self.sink.emit(&LampEvent::Connected {
                    endpoint: self.endpoint.clone(),
                    session: connection.id,
                });
                Ok(connection)
            }
            Err(e) => {
                self.connection_state = ConnectionState::Disconnected;
                self.sink.emit(&LampEvent::ConnectFailed {
                    endpoint: self.endpoint.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
