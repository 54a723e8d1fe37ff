// support/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    extract::{
        WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    routing::get,
};
use smart_lamp::{
    Endpoint, TransportError,
    transport::{Connector, Inbound, MessageStream},
};
use std::collections::VecDeque;
use std::io;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[derive(Default)]
struct Shared {
    scripts: Mutex<VecDeque<Vec<Inbound>>>,
    attempts: AtomicUsize,
    closes: AtomicUsize,
    drained: Mutex<Option<oneshot::Sender<()>>>,
}

/// Hands out one scripted stream per connect. Once the scripts run out,
/// further connects are refused.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    shared: Arc<Shared>,
    failing_close: bool,
}

impl ScriptedConnector {
    pub fn new(scripts: Vec<Vec<Inbound>>) -> Self {
        let connector = Self::default();
        *connector.shared.scripts.lock().unwrap() = scripts.into();
        connector
    }

    pub fn with_failing_close(mut self) -> Self {
        self.failing_close = true;
        self
    }

    pub fn attempts(&self) -> usize {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.shared.closes.load(Ordering::SeqCst)
    }

    /// Resolves once a stream has handed out its last scripted frame and
    /// the dispatcher is waiting on it again.
    pub fn drained(&self) -> impl Future<Output = ()> + use<> {
        let (tx, rx) = oneshot::channel();
        *self.shared.drained.lock().unwrap() = Some(tx);
        async move {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    async fn connect(&self, endpoint: &Endpoint) -> Result<ScriptedStream, TransportError> {
        self.shared.attempts.fetch_add(1, Ordering::SeqCst);
        let script = self.shared.scripts.lock().unwrap().pop_front();
        match script {
            Some(frames) => Ok(ScriptedStream {
                frames: frames.into(),
                shared: Arc::clone(&self.shared),
                failing_close: self.failing_close,
            }),
            None => Err(TransportError::from_connect(
                endpoint,
                io::Error::from(io::ErrorKind::ConnectionRefused),
            )),
        }
    }
}

pub struct ScriptedStream {
    frames: VecDeque<Inbound>,
    shared: Arc<Shared>,
    failing_close: bool,
}

#[async_trait]
impl MessageStream for ScriptedStream {
    async fn recv(&mut self) -> Inbound {
        if let Some(frame) = self.frames.pop_front() {
            return frame;
        }
        let drained = self.shared.drained.lock().unwrap().take();
        if let Some(tx) = drained {
            let _ = tx.send(());
        }
        std::future::pending().await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
        if self.failing_close {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        Ok(())
    }
}

pub fn message(text: &str) -> Inbound {
    Inbound::Message(text.to_string())
}

/// How a websocket session ends after its frames are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    CloseFrame,
    /// Drop the socket without a closing handshake.
    Drop,
}

/// Websocket command source: every lamp that connects to `/lamp` gets
/// `frames` as text messages followed by a close frame.
pub async fn spawn_command_source(frames: Vec<&'static str>) -> Endpoint {
    spawn_session_source(vec![(frames, Ending::CloseFrame)]).await
}

/// Serves one session per upgrade from `sessions`, in order. The last
/// session is repeated for any further connects.
pub async fn spawn_session_source(sessions: Vec<(Vec<&'static str>, Ending)>) -> Endpoint {
    let last = sessions.last().cloned().unwrap_or((Vec::new(), Ending::CloseFrame));
    let sessions = Arc::new(Mutex::new(VecDeque::from(sessions)));
    let app = Router::new().route(
        "/lamp",
        get(move |ws: WebSocketUpgrade| {
            let (frames, ending) = sessions.lock().unwrap().pop_front().unwrap_or(last.clone());
            async move { ws.on_upgrade(move |socket| push_commands(socket, frames, ending)) }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Endpoint::new("127.0.0.1", port)
}

async fn push_commands(mut socket: WebSocket, frames: Vec<&'static str>, ending: Ending) {
    for frame in frames {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    match ending {
        Ending::CloseFrame => {
            let _ = socket.send(Message::Close(None)).await;
        }
        Ending::Drop => drop(socket),
    }
}
