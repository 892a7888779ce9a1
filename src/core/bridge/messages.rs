//! Control frames exchanged with the voice backend.
//!
//! Every frame is a JSON object tagged by `type`. The gateway sends `start`
//! once and then one `audio` frame per telephony chunk; the backend answers
//! with `start_ack`, `audio` and assorted informational frames.

use serde::{Deserialize, Serialize};

use super::config::AudioConfig;
use super::error::{BridgeError, BridgeResult};

/// Frames sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutgoingFrame {
    /// Session handshake carrying the caller's credentials
    #[serde(rename = "start")]
    Start {
        #[serde(rename = "apiKey")]
        api_key: String,
        #[serde(rename = "assistantId")]
        assistant_id: String,
        #[serde(rename = "audioConfig", skip_serializing_if = "Option::is_none")]
        audio_config: Option<AudioConfig>,
    },

    /// Base64 of little-endian 16-bit PCM
    #[serde(rename = "audio")]
    Audio { audio: String },
}

impl OutgoingFrame {
    pub fn to_json(&self) -> BridgeResult<String> {
        serde_json::to_string(self).map_err(|e| BridgeError::SerializationError(e.to_string()))
    }
}

/// Frames received from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingFrame {
    /// Base64 of little-endian 16-bit PCM
    Audio { audio: String },
    /// Handshake acknowledgment
    StartAck,
    /// Any other `type`; logged, never forwarded
    Other { frame_type: String },
}

/// Loose view of a backend frame, before dispatch on `type`.
#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(rename = "type", default)]
    frame_type: Option<serde_json::Value>,
    #[serde(default)]
    audio: Option<serde_json::Value>,
}

impl IncomingFrame {
    /// Parse a backend frame.
    ///
    /// Unknown types are not an error; they come back as [`IncomingFrame::Other`].
    pub fn parse(text: &str) -> BridgeResult<Self> {
        let raw: RawFrame =
            serde_json::from_str(text).map_err(|e| BridgeError::MalformedFrame(e.to_string()))?;

        let frame_type = match raw.frame_type {
            Some(serde_json::Value::String(t)) => t,
            _ => return Err(BridgeError::MissingFrameType),
        };

        match frame_type.as_str() {
            "audio" => {
                match raw.audio {
                    Some(serde_json::Value::String(audio)) => Ok(IncomingFrame::Audio { audio }),
                    _ => Err(BridgeError::AudioPayload(
                        "audio frame without string payload".to_string(),
                    )),
                }
            }
            "start_ack" => Ok(IncomingFrame::StartAck),
            _ => Ok(IncomingFrame::Other { frame_type }),
        }
    }

    /// The wire `type` of this frame.
    pub fn frame_type(&self) -> &str {
        match self {
            IncomingFrame::Audio { .. } => "audio",
            IncomingFrame::StartAck => "start_ack",
            IncomingFrame::Other { frame_type } => frame_type,
        }
    }
}
