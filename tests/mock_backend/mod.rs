//! WebSocket Mock Voice Backend
//!
//! Accepts bridge connections and reports everything they send. Commands
//! are delivered to the first connection.
//! Behaviour is scripted per test:
//! - `ack_start`: answer `start` with `start_ack`
//! - `echo_audio`: answer each `audio` frame with the same payload
//! - `hold_handshake`: keep the TCP connection unaccepted until released

// Not every test binary uses every helper
#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// How long tests wait for an expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default)]
pub struct MockOptions {
    pub ack_start: bool,
    pub echo_audio: bool,
    pub hold_handshake: bool,
}

/// What the mock observed
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// WebSocket handshake completed
    Connected,
    /// Text frame parsed as JSON
    Frame(Value),
    /// Close frame received from the bridge
    CloseReceived,
    /// Stream ended
    Disconnected,
}

/// Scripted actions
#[derive(Debug)]
pub enum BackendCommand {
    SendText(String),
    SendBinary(Vec<u8>),
    Close,
}

pub struct MockBackend {
    pub url: String,
    events: mpsc::UnboundedReceiver<BackendEvent>,
    commands: mpsc::UnboundedSender<BackendCommand>,
    release: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub async fn spawn(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (event_tx, events) = mpsc::unbounded_channel();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (release, release_rx) = oneshot::channel();

        tokio::spawn(run(listener, options, event_tx, command_rx, release_rx));

        Self {
            url: format!("ws://{addr}/audio-websocket"),
            events,
            commands,
            release: Some(release),
        }
    }

    /// Let a held handshake proceed.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
    }

    pub fn send(&self, command: BackendCommand) {
        self.commands.send(command).unwrap();
    }

    pub fn send_json(&self, value: Value) {
        self.send(BackendCommand::SendText(value.to_string()));
    }

    pub async fn next_event(&mut self) -> BackendEvent {
        timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .expect("timed out waiting for backend event")
            .expect("mock backend stopped")
    }

    /// Wait for the next JSON frame, failing on any other event.
    pub async fn next_frame(&mut self) -> Value {
        match self.next_event().await {
            BackendEvent::Frame(value) => value,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    /// Returns the next event if one arrives within `wait`.
    pub async fn try_next_event(&mut self, wait: Duration) -> Option<BackendEvent> {
        timeout(wait, self.events.recv()).await.ok().flatten()
    }
}

async fn run(
    listener: TcpListener,
    options: MockOptions,
    events: mpsc::UnboundedSender<BackendEvent>,
    commands: mpsc::UnboundedReceiver<BackendCommand>,
    release: oneshot::Receiver<()>,
) {
    let Ok((stream, _)) = listener.accept().await else {
        return;
    };
    if options.hold_handshake && release.await.is_err() {
        return;
    }
    tokio::spawn(serve(stream, options, events.clone(), Some(commands)));

    // Later connections share the event stream but take no commands
    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(serve(stream, options, events.clone(), None));
    }
}

async fn serve(
    stream: TcpStream,
    options: MockOptions,
    events: mpsc::UnboundedSender<BackendEvent>,
    commands: Option<mpsc::UnboundedReceiver<BackendCommand>>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(_) => return,
    };
    let _ = events.send(BackendEvent::Connected);

    let (mut write, mut read) = ws_stream.split();
    let mut commands_open = commands.is_some();
    let (_unused_tx, idle_rx) = mpsc::unbounded_channel();
    let mut commands = commands.unwrap_or(idle_rx);

    loop {
        tokio::select! {
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let Ok(frame) = serde_json::from_str::<Value>(text.as_str()) else {
                        continue;
                    };
                    let _ = events.send(BackendEvent::Frame(frame.clone()));

                    let reply = match frame["type"].as_str() {
                        Some("start") if options.ack_start => Some(json!({"type": "start_ack"})),
                        Some("audio") if options.echo_audio => {
                            Some(json!({"type": "audio", "audio": frame["audio"]}))
                        }
                        _ => None,
                    };
                    if let Some(reply) = reply
                        && write.send(Message::Text(reply.to_string().into())).await.is_err()
                    {
                        let _ = events.send(BackendEvent::Disconnected);
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    let _ = events.send(BackendEvent::CloseReceived);
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => {
                    let _ = events.send(BackendEvent::Disconnected);
                    break;
                }
            },
            cmd = commands.recv(), if commands_open => match cmd {
                Some(BackendCommand::SendText(text)) => {
                    let _ = write.send(Message::Text(text.into())).await;
                }
                Some(BackendCommand::SendBinary(data)) => {
                    let _ = write.send(Message::Binary(data.into())).await;
                }
                Some(BackendCommand::Close) => {
                    let _ = write.send(Message::Close(None)).await;
                }
                None => commands_open = false,
            }
        }
    }
}
