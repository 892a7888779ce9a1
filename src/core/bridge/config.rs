//! Backend connection settings shared by every session.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Default voice backend endpoint.
pub const DEFAULT_BACKEND_URL: &str = "wss://api.vapi.ai/audio-websocket";

/// Sample rate advertised to the backend when none is configured.
pub const DEFAULT_BACKEND_SAMPLE_RATE: u32 = 16000;

/// Encoding advertised to the backend when none is configured.
pub const DEFAULT_BACKEND_ENCODING: &str = "LINEAR16";

/// `audioConfig` block of the `start` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub encoding: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_BACKEND_SAMPLE_RATE,
            encoding: DEFAULT_BACKEND_ENCODING.to_string(),
        }
    }
}

/// Configuration handed to the session factory.
///
/// Built once from [`crate::config::ServerConfig`] and shared across sessions
/// behind an `Arc`; sessions never read the process environment.
#[derive(Clone)]
pub struct BridgeConfig {
    /// WebSocket URL of the voice backend
    pub backend_url: String,
    /// Credential sent in the `start` frame
    pub api_key: String,
    /// Assistant identifier sent in the `start` frame
    pub assistant_id: String,
    /// Audio format advertised in `start`; `None` omits the block
    pub audio_config: Option<AudioConfig>,
}

impl BridgeConfig {
    pub fn new(
        backend_url: impl Into<String>,
        api_key: impl Into<String>,
        assistant_id: impl Into<String>,
    ) -> Self {
        Self {
            backend_url: backend_url.into(),
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            audio_config: Some(AudioConfig::default()),
        }
    }

    pub fn with_audio_config(mut self, audio_config: Option<AudioConfig>) -> Self {
        self.audio_config = audio_config;
        self
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("backend_url", &self.backend_url)
            .field("api_key", &"<redacted>")
            .field("assistant_id", &self.assistant_id)
            .field("audio_config", &self.audio_config)
            .finish()
    }
}

impl Drop for BridgeConfig {
    fn drop(&mut self) {
        self.api_key.zeroize();
    }
}
