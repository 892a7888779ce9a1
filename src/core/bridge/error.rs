use thiserror::Error;

/// Errors raised while bridging a call.
///
/// Only [`BridgeError::ConnectionFailed`] and [`BridgeError::WebSocketError`]
/// end a session; the rest are per-frame faults that are logged and skipped.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The backend connection could not be opened
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Transport-level failure on an open leg
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Backend frame is not valid JSON
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Backend frame has no string `type` field
    #[error("Frame has no usable type")]
    MissingFrameType,

    /// Audio payload could not be converted
    #[error("Audio payload error: {0}")]
    AudioPayload(String),

    /// Outgoing frame could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Event arrived in a state that does not accept it
    #[error("Session error: {0}")]
    SessionError(String),
}

impl BridgeError {
    /// Whether the error ends the session rather than a single frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::ConnectionFailed(_) | BridgeError::WebSocketError(_)
        )
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for BridgeError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        BridgeError::WebSocketError(err.to_string())
    }
}

impl From<axum::Error> for BridgeError {
    fn from(err: axum::Error) -> Self {
        BridgeError::WebSocketError(err.to_string())
    }
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
