// utils.rs
use crate::{
    events::{EventSink, LampEvent},
    transport::{Connection, MessageStream},
};
use chrono::Utc;

/// Closes the stream and consumes the connection. A failed close is
/// reported, the connection is still dropped.
pub async fn release_connection<S, E>(connection: Connection<S>, sink: &mut E)
where
    S: MessageStream,
    E: EventSink,
{
    let Connection {
        id,
        endpoint,
        established_at,
        mut stream,
    } = connection;

    if let Err(e) = stream.close().await {
        sink.emit(&LampEvent::ReleaseFailed {
            endpoint: endpoint.clone(),
            error: e.to_string(),
        });
    }
    drop(stream);

    sink.emit(&LampEvent::Released {
        endpoint,
        session: id,
        uptime_secs: (Utc::now() - established_at).num_seconds(),
    });
}
