// metrics/mod.rs
use crate::events::LampEvent;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

pub const COMMANDS_APPLIED: &str = "lamp_commands_applied_total";
pub const COMMANDS_REJECTED: &str = "lamp_commands_rejected_total";
/// Peer resets seen. Whether the reconnect after it worked shows up as a
/// `Connected` or `ConnectFailed` event, not here.
pub const RESETS: &str = "lamp_resets_total";
pub const STREAM_FAULTS: &str = "lamp_stream_faults_total";
pub const POWER: &str = "lamp_power";

type Label = (&'static str, &'static str);

/// Installs the Prometheus recorder with its own HTTP listener.
/// Must be called from inside a tokio runtime.
pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Counter (and optional label) bumped for an event, if any.
pub fn counter_for(event: &LampEvent) -> Option<(&'static str, Option<Label>)> {
    match event {
        LampEvent::PowerChanged { power: true } => Some((COMMANDS_APPLIED, Some(("command", "ON")))),
        LampEvent::PowerChanged { power: false } => {
            Some((COMMANDS_APPLIED, Some(("command", "OFF"))))
        }
        LampEvent::ColorChanged { .. } => Some((COMMANDS_APPLIED, Some(("command", "COLOR")))),
        LampEvent::ColorMissing => Some((COMMANDS_REJECTED, Some(("reason", "missing_color")))),
        LampEvent::Rejected(reason) => Some((COMMANDS_REJECTED, Some(("reason", reason.reason())))),
        LampEvent::PeerReset { .. } => Some((RESETS, None)),
        LampEvent::StreamFault { .. } => Some((STREAM_FAULTS, None)),
        _ => None,
    }
}

/// No-op until a recorder is installed.
pub fn record(event: &LampEvent) {
    match counter_for(event) {
        Some((name, Some((key, value)))) => ::metrics::counter!(name, key => value).increment(1),
        Some((name, None)) => ::metrics::counter!(name).increment(1),
        None => {}
    }

    if let LampEvent::PowerChanged { power } = event {
        ::metrics::gauge!(POWER).set(if *power { 1.0 } else { 0.0 });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::CommandError, models::Endpoint};

    #[test]
    fn resets_are_counted_as_resets() {
        let reset = LampEvent::PeerReset {
            endpoint: Endpoint::default(),
        };
        assert_eq!(counter_for(&reset), Some((RESETS, None)));
    }

    #[test]
    fn connection_outcomes_are_not_counted() {
        let endpoint = Endpoint::default();
        let connected = LampEvent::Connected {
            endpoint: endpoint.clone(),
            session: uuid::Uuid::nil(),
        };
        let failed = LampEvent::ConnectFailed {
            endpoint,
            error: "refused".into(),
        };
        assert_eq!(counter_for(&connected), None);
        assert_eq!(counter_for(&failed), None);
    }

    #[test]
    fn commands_are_labelled() {
        assert_eq!(
            counter_for(&LampEvent::PowerChanged { power: true }),
            Some((COMMANDS_APPLIED, Some(("command", "ON"))))
        );
        assert_eq!(
            counter_for(&LampEvent::Rejected(CommandError::MissingCommand)),
            Some((COMMANDS_REJECTED, Some(("reason", "missing_command"))))
        );
    }
}
