// lib.rs
//! A simulated network smart lamp.
//!
//! The lamp connects out to a command source, reads JSON commands
//! (`{"command":"ON|OFF|COLOR","metadata":"..."}`) one per line or per
//! websocket message, and applies them to its in-memory state.

pub mod commands;
pub mod config;
pub mod devices;
pub mod dispatcher;
pub mod docs;
pub mod error;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod transport;
pub mod utils;

pub use dispatcher::{Dispatcher, Termination};
pub use error::{CommandError, LampError, TransportError};
pub use events::{EventSink, LampEvent, TracingSink};
pub use models::{DeviceState, Endpoint};
