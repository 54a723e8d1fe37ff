// events/mod.rs
use crate::{error::CommandError, models::Endpoint};
use std::fmt;
use tracing::{Level, error, field, info, warn};
use uuid::Uuid;

/// Everything observable the lamp does, as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LampEvent {
    PowerChanged { power: bool },
    ColorChanged { color: String },
    ColorMissing,
    Rejected(CommandError),
    Connected { endpoint: Endpoint, session: Uuid },
    ConnectFailed { endpoint: Endpoint, error: String },
    PeerClosed { endpoint: Endpoint },
    PeerReset { endpoint: Endpoint },
    StreamFault { endpoint: Endpoint, detail: String },
    FaultLimitReached { endpoint: Endpoint, faults: u32 },
    ShuttingDown { endpoint: Endpoint },
    ReleaseFailed { endpoint: Endpoint, error: String },
    Released {
        endpoint: Endpoint,
        session: Uuid,
        uptime_secs: i64,
    },
}

impl LampEvent {
    pub fn level(&self) -> Level {
        match self {
            LampEvent::PowerChanged { .. }
            | LampEvent::ColorChanged { .. }
            | LampEvent::Connected { .. }
            | LampEvent::ShuttingDown { .. }
            | LampEvent::Released { .. } => Level::INFO,
            LampEvent::ColorMissing | LampEvent::Rejected(_) => Level::WARN,
            LampEvent::ConnectFailed { .. }
            | LampEvent::PeerClosed { .. }
            | LampEvent::PeerReset { .. }
            | LampEvent::StreamFault { .. }
            | LampEvent::FaultLimitReached { .. }
            | LampEvent::ReleaseFailed { .. } => Level::ERROR,
        }
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            LampEvent::Connected { endpoint, .. }
            | LampEvent::ConnectFailed { endpoint, .. }
            | LampEvent::PeerClosed { endpoint }
            | LampEvent::PeerReset { endpoint }
            | LampEvent::StreamFault { endpoint, .. }
            | LampEvent::FaultLimitReached { endpoint, .. }
            | LampEvent::ShuttingDown { endpoint }
            | LampEvent::ReleaseFailed { endpoint, .. }
            | LampEvent::Released { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    pub fn session(&self) -> Option<&Uuid> {
        match self {
            LampEvent::Connected { session, .. } | LampEvent::Released { session, .. } => {
                Some(session)
            }
            _ => None,
        }
    }

    /// True for events that report a state change of the lamp itself.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            LampEvent::PowerChanged { .. } | LampEvent::ColorChanged { .. }
        )
    }
}

impl fmt::Display for LampEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LampEvent::PowerChanged { power: true } => f.write_str("Lamp turned on"),
            LampEvent::PowerChanged { power: false } => f.write_str("Lamp turned off"),
            LampEvent::ColorChanged { color } => write!(f, "Color changed to {color}"),
            LampEvent::ColorMissing => f.write_str("No color provided"),
            LampEvent::Rejected(reason) => write!(f, "{reason}"),
            LampEvent::Connected { endpoint, .. } => write!(f, "Connected to {endpoint}"),
            LampEvent::ConnectFailed { endpoint, error } => {
                write!(f, "Error connecting to {endpoint}: {error}")
            }
            LampEvent::PeerClosed { endpoint } => write!(f, "Connection to {endpoint} closed"),
            LampEvent::PeerReset { endpoint } => {
                write!(f, "Connection to {endpoint} reset, reconnecting")
            }
            LampEvent::StreamFault { endpoint, detail } => {
                write!(f, "Connection to {endpoint} error: {detail}")
            }
            LampEvent::FaultLimitReached { endpoint, faults } => {
                write!(f, "Giving up on {endpoint} after {faults} consecutive errors")
            }
            LampEvent::ShuttingDown { .. } => f.write_str("Shutting down lamp"),
            LampEvent::ReleaseFailed { endpoint, error } => {
                write!(f, "Error closing connection to {endpoint}: {error}")
            }
            LampEvent::Released {
                endpoint,
                uptime_secs,
                ..
            } => write!(f, "Connection to {endpoint} released after {uptime_secs}s"),
        }
    }
}

pub trait EventSink: Send {
    fn emit(&mut self, event: &LampEvent);
}

/// Records events in order. Handy for assertions.
impl EventSink for Vec<LampEvent> {
    fn emit(&mut self, event: &LampEvent) {
        self.push(event.clone());
    }
}

/// Production sink: structured log lines plus metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &LampEvent) {
        let endpoint = event.endpoint().map(field::display);
        let session = event.session().map(field::display);
        let level = event.level();
        if level == Level::ERROR {
            error!(endpoint, session, "{event}");
        } else if level == Level::WARN {
            warn!(endpoint, session, "{event}");
        } else {
            info!(endpoint, session, "{event}");
        }

        crate::metrics::record(event);
    }
}
