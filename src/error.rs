// error.rs
use crate::models::Endpoint;
use std::io;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Why an inbound unit was discarded before reaching the lamp.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid JSON format: {0}")]
    InvalidFormat(String),
    #[error("No command provided")]
    MissingCommand,
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl CommandError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "invalid_format",
            Self::MissingCommand => "missing_command",
            Self::UnknownCommand(_) => "unknown_command",
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection to {endpoint} refused")]
    Refused {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    #[error("Error connecting to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },
    #[error("WebSocket handshake with {endpoint} failed: {source}")]
    Handshake {
        endpoint: Endpoint,
        #[source]
        source: Box<tungstenite::Error>,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

impl TransportError {
    /// Classifies a failed connect attempt.
    pub fn from_connect(endpoint: &Endpoint, source: io::Error) -> Self {
        let endpoint = endpoint.clone();
        if source.kind() == io::ErrorKind::ConnectionRefused {
            Self::Refused { endpoint, source }
        } else {
            Self::Connect { endpoint, source }
        }
    }

    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused { .. })
    }
}

#[derive(Error, Debug)]
pub enum LampError {
    #[error("Initial connection failed: {0}")]
    Connect(#[from] TransportError),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("Invalid config: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}
