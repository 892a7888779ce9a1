//! Outbound WebSocket connection to the voice backend.
//!
//! The connection is split into a write half, drained by a dedicated writer
//! task fed through [`BackendRoute`], and a read half polled by the session
//! driver.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::error::{BridgeError, BridgeResult};

/// Capacity of the backend write channel.
pub const BACKEND_CHANNEL_CAPACITY: usize = 256;

pub type BackendStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type BackendSink = SplitSink<BackendStream, Message>;
pub type BackendSource = SplitStream<BackendStream>;

/// Writes queued for the backend leg.
///
/// Pings are answered by tungstenite itself.
#[derive(Debug)]
pub enum BackendRoute {
    /// Serialized control frame
    Frame(String),
    /// Send a close frame and stop writing
    Close,
}

/// Open the backend WebSocket.
///
/// No timeout is applied; a session whose backend never answers stays pending
/// until the telephony leg goes away.
pub async fn connect(url: &str) -> BridgeResult<BackendStream> {
    let request = url
        .into_client_request()
        .map_err(|e| BridgeError::ConnectionFailed(format!("invalid backend url: {e}")))?;

    let (ws_stream, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| BridgeError::ConnectionFailed(e.to_string()))?;

    tracing::debug!(status = %response.status(), "Backend WebSocket handshake complete");
    Ok(ws_stream)
}

/// Spawn the writer task for the backend leg.
///
/// The task ends after sending `Close`, when every sender is dropped, or on
/// the first write failure; the read half observes the failure as a closed
/// stream.
pub fn spawn_writer(
    mut sink: BackendSink,
) -> (mpsc::Sender<BackendRoute>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<BackendRoute>(BACKEND_CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        while let Some(route) = rx.recv().await {
            match route {
                BackendRoute::Frame(json) => {
                    if let Err(e) = sink.send(Message::Text(json.into())).await {
                        tracing::error!("Failed to write to backend: {}", e);
                        break;
                    }
                }
                BackendRoute::Close => {
                    tracing::debug!("Closing backend WebSocket");
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!("Backend close: {}", e);
                    }
                    break;
                }
            }
        }
    });

    (tx, handle)
}

/// Split an open backend connection and start its writer.
pub fn start(
    stream: BackendStream,
) -> (mpsc::Sender<BackendRoute>, BackendSource, JoinHandle<()>) {
    let (sink, source) = stream.split();
    let (tx, handle) = spawn_writer(sink);
    (tx, source, handle)
}
