//! Telephony WebSocket handler
//!
//! Drives one [`Session`] per connection: the session decides what to
//! forward and when to close, this module does the socket I/O.

use axum::{
    Extension,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as BackendMessage;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::core::bridge::{BackendRoute, BridgeError, Leg, Session, backend};
use crate::state::{AppState, SessionPermit};

use super::TelephonyRoute;

/// Channel buffer size for outbound telephony audio
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Telephony WebSocket handler
///
/// Upgrades the HTTP connection to WebSocket and starts a bridged session.
/// The [`SessionPermit`] inserted by the session limit middleware is held
/// until the session ends.
pub async fn telephony_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    permit: Option<Extension<SessionPermit>>,
) -> Response {
    let permit = permit.map(|Extension(permit)| permit);

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| {
            let session = Session::new(state.bridge.clone());
            let span = info_span!("session", session_id = %session.id());
            handle_telephony_socket(socket, session, permit).instrument(span)
        })
}

/// Spawn the writer task for the telephony leg.
fn spawn_telephony_writer(
    mut sender: SplitSink<WebSocket, Message>,
) -> (mpsc::Sender<TelephonyRoute>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<TelephonyRoute>(CHANNEL_BUFFER_SIZE);

    let handle = tokio::spawn(
        async move {
            while let Some(route) = rx.recv().await {
                match route {
                    TelephonyRoute::Audio(data) => {
                        if let Err(e) = sender.send(Message::Binary(data)).await {
                            error!("Failed to write to telephony: {}", e);
                            break;
                        }
                    }
                    TelephonyRoute::Close => {
                        debug!("Closing telephony WebSocket");
                        // Replying to a peer close reports the connection as closed
                        if let Err(e) = sender.send(Message::Close(None)).await {
                            debug!("Telephony close: {}", e);
                        }
                        break;
                    }
                }
            }
        }
        .in_current_span(),
    );

    (tx, handle)
}

/// Run one bridged call to completion.
async fn handle_telephony_socket(
    socket: WebSocket,
    mut session: Session,
    _permit: Option<SessionPermit>,
) {
    info!("Telephony connection accepted");

    let (sender, mut receiver) = socket.split();
    let (telephony_tx, telephony_task) = spawn_telephony_writer(sender);

    // Pending: connect to the backend while draining telephony
    let backend_url = session.config().backend_url.clone();
    let connect = backend::connect(&backend_url);
    tokio::pin!(connect);

    let connected = loop {
        select! {
            result = &mut connect => break Some(result),
            msg = receiver.next() => match msg {
                Some(Ok(Message::Binary(chunk))) => {
                    session.on_telephony_audio(&chunk);
                }
                Some(Ok(Message::Close(_))) => {
                    let _ = telephony_tx.send(TelephonyRoute::Close).await;
                    break None;
                }
                None => break None,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if is_session_fault(Leg::Telephony, e.into()) {
                        break None;
                    }
                }
            }
        }
    };

    let stream = match connected {
        Some(Ok(stream)) => stream,
        Some(Err(e)) => {
            error!("Backend connection failed: {}", e);
            abandon(session, telephony_tx, telephony_task, None).await;
            return;
        }
        None => {
            info!("Telephony closed before backend connected");
            session.on_leg_closed(Leg::Telephony);
            finish(session, telephony_tx, telephony_task, None).await;
            return;
        }
    };

    let (backend_tx, mut backend_rx, backend_task) = backend::start(stream);

    let start = match session.on_backend_open() {
        Ok(start) => start,
        Err(e) => {
            error!("Failed to start backend session: {}", e);
            let _ = backend_tx.send(BackendRoute::Close).await;
            drop(backend_tx);
            abandon(session, telephony_tx, telephony_task, Some(backend_task)).await;
            return;
        }
    };
    if backend_tx.send(BackendRoute::Frame(start)).await.is_err() {
        warn!("Backend writer stopped before start was sent");
    }

    // Active: relay until a leg closes. A leg that closed with a close frame
    // is owed a close reply from its own writer.
    let (closed, close_received) = loop {
        select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Binary(chunk))) => {
                    if let Some(frame) = session.on_telephony_audio(&chunk)
                        && backend_tx.send(BackendRoute::Frame(frame)).await.is_err()
                    {
                        break (Leg::Backend, false);
                    }
                }
                Some(Ok(Message::Text(_))) => {
                    debug!("Ignoring text frame from telephony");
                }
                Some(Ok(Message::Close(_))) => break (Leg::Telephony, true),
                None => break (Leg::Telephony, false),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if is_session_fault(Leg::Telephony, e.into()) {
                        break (Leg::Telephony, false);
                    }
                }
            },
            msg = backend_rx.next() => match msg {
                Some(Ok(BackendMessage::Text(text))) => {
                    if let Some(ulaw) = session.on_backend_text(text.as_str())
                        && telephony_tx.send(TelephonyRoute::Audio(ulaw)).await.is_err()
                    {
                        break (Leg::Telephony, false);
                    }
                }
                Some(Ok(BackendMessage::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => {
                        if let Some(ulaw) = session.on_backend_text(text)
                            && telephony_tx.send(TelephonyRoute::Audio(ulaw)).await.is_err()
                        {
                            break (Leg::Telephony, false);
                        }
                    }
                    Err(_) => warn!("Dropping {} byte non-UTF-8 backend frame", data.len()),
                },
                Some(Ok(BackendMessage::Close(frame))) => {
                    info!(frame = ?frame, "Backend sent close");
                    break (Leg::Backend, true);
                }
                None => break (Leg::Backend, false),
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if is_session_fault(Leg::Backend, e.into()) {
                        break (Leg::Backend, false);
                    }
                }
            }
        }
    };

    if close_received {
        reply_close(closed, &telephony_tx, &backend_tx).await;
    }
    close_peer(&mut session, closed, &telephony_tx, Some(&backend_tx)).await;
    drop(backend_tx);
    finish(session, telephony_tx, telephony_task, Some(backend_task)).await;
}

/// Answer a close frame received on `leg` through that leg's own writer.
async fn reply_close(
    leg: Leg,
    telephony_tx: &mpsc::Sender<TelephonyRoute>,
    backend_tx: &mpsc::Sender<BackendRoute>,
) {
    match leg {
        Leg::Telephony => {
            let _ = telephony_tx.send(TelephonyRoute::Close).await;
        }
        Leg::Backend => {
            let _ = backend_tx.send(BackendRoute::Close).await;
        }
    }
}

/// Record that `closed` went away and close the other leg if still open.
async fn close_peer(
    session: &mut Session,
    closed: Leg,
    telephony_tx: &mpsc::Sender<TelephonyRoute>,
    backend_tx: Option<&mpsc::Sender<BackendRoute>>,
) {
    let Some(other) = session.on_leg_closed(closed) else {
        return;
    };

    match other {
        Leg::Telephony => {
            let _ = telephony_tx.send(TelephonyRoute::Close).await;
        }
        Leg::Backend => {
            if let Some(tx) = backend_tx {
                let _ = tx.send(BackendRoute::Close).await;
            }
        }
    }
    session.on_leg_released(other);
}

/// Close telephony after the backend failed to come up, then finish.
async fn abandon(
    mut session: Session,
    telephony_tx: mpsc::Sender<TelephonyRoute>,
    telephony_task: JoinHandle<()>,
    backend_task: Option<JoinHandle<()>>,
) {
    close_peer(&mut session, Leg::Backend, &telephony_tx, None).await;
    finish(session, telephony_tx, telephony_task, backend_task).await;
}

/// Log a read error on `leg`; returns whether it ends the session.
fn is_session_fault(leg: Leg, err: BridgeError) -> bool {
    if err.is_fatal() {
        warn!(leg = %leg, "{}", err);
        true
    } else {
        debug!(leg = %leg, "Ignoring read error: {}", err);
        false
    }
}

/// Wait for the writers to drain and log the session summary.
async fn finish(
    session: Session,
    telephony_tx: mpsc::Sender<TelephonyRoute>,
    telephony_task: JoinHandle<()>,
    backend_task: Option<JoinHandle<()>>,
) {
    drop(telephony_tx);
    if let Err(e) = telephony_task.await {
        warn!("Telephony writer task failed: {}", e);
    }
    if let Some(task) = backend_task
        && let Err(e) = task.await
    {
        warn!("Backend writer task failed: {}", e);
    }

    let stats = session.stats();
    info!(
        state = %session.state(),
        acknowledged = session.is_acknowledged(),
        chunks_to_backend = stats.chunks_to_backend,
        chunks_to_telephony = stats.chunks_to_telephony,
        dropped_chunks = stats.dropped_chunks,
        dropped_frames = stats.dropped_frames,
        observed_frames = stats.observed_frames,
        "Session ended"
    );
}
