//! Per-call bridging session.
//!
//! A [`Session`] pairs one telephony leg with one backend leg. It owns the
//! lifecycle state machine and the frame translation in both directions, but
//! performs no I/O: the connection driver feeds it named events and carries out
//! the writes and closes it asks for. All methods are synchronous and run to
//! completion, so a session is only ever mutated from its driver's loop.
//!
//! ```text
//! Pending ──on_backend_open──▶ Active ──on_leg_closed──▶ Closing ──on_leg_released──▶ Closed
//!    └──────────────────────────on_leg_closed (no backend yet)─────────────────────────▶┘
//! ```

use std::fmt;
use std::sync::Arc;

use base64::prelude::*;
use bytes::Bytes;
use tracing::{debug, info, warn};

use super::config::BridgeConfig;
use super::error::{BridgeError, BridgeResult};
use super::messages::{IncomingFrame, OutgoingFrame};
use crate::core::codec;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Telephony connected, backend connection in flight
    Pending,
    /// `start` issued, relaying in both directions
    Active,
    /// One leg has gone away, the other is being closed
    Closing,
    /// Both legs released
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Pending => write!(f, "pending"),
            SessionState::Active => write!(f, "active"),
            SessionState::Closing => write!(f, "closing"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

/// One side of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Telephony,
    Backend,
}

impl Leg {
    pub fn other(self) -> Leg {
        match self {
            Leg::Telephony => Leg::Backend,
            Leg::Backend => Leg::Telephony,
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Telephony => write!(f, "telephony"),
            Leg::Backend => write!(f, "backend"),
        }
    }
}

/// Relay counters, logged when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Telephony chunks forwarded to the backend
    pub chunks_to_backend: u64,
    /// Backend audio frames forwarded to telephony
    pub chunks_to_telephony: u64,
    /// Telephony chunks dropped (not active yet, or conversion fault)
    pub dropped_chunks: u64,
    /// Backend frames dropped (parse or payload fault)
    pub dropped_frames: u64,
    /// Informational backend frames observed
    pub observed_frames: u64,
}

/// State machine for one bridged call.
pub struct Session {
    id: String,
    config: Arc<BridgeConfig>,
    state: SessionState,
    telephony_open: bool,
    backend_open: bool,
    acknowledged: bool,
    stats: SessionStats,
}

impl Session {
    /// Create a session for a freshly accepted telephony connection.
    pub fn new(config: Arc<BridgeConfig>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), config)
    }

    pub fn with_id(id: impl Into<String>, config: Arc<BridgeConfig>) -> Self {
        Self {
            id: id.into(),
            config,
            state: SessionState::Pending,
            telephony_open: true,
            backend_open: false,
            acknowledged: false,
            stats: SessionStats::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Whether the backend has acknowledged `start`.
    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn is_open(&self, leg: Leg) -> bool {
        match leg {
            Leg::Telephony => self.telephony_open,
            Leg::Backend => self.backend_open,
        }
    }

    /// The backend connection opened.
    ///
    /// Returns the `start` frame to send and moves the session to `Active`
    /// without waiting for `start_ack`.
    pub fn on_backend_open(&mut self) -> BridgeResult<String> {
        if self.state != SessionState::Pending {
            return Err(BridgeError::SessionError(format!(
                "backend opened while {}",
                self.state
            )));
        }

        let start = OutgoingFrame::Start {
            api_key: self.config.api_key.clone(),
            assistant_id: self.config.assistant_id.clone(),
            audio_config: self.config.audio_config.clone(),
        }
        .to_json()?;

        self.backend_open = true;
        self.state = SessionState::Active;
        info!(assistant_id = %self.config.assistant_id, "Backend connected, start sent");
        Ok(start)
    }

    /// A μ-law chunk arrived from telephony.
    ///
    /// Returns the `audio` frame to forward, or `None` when the chunk was
    /// dropped.
    pub fn on_telephony_audio(&mut self, chunk: &[u8]) -> Option<String> {
        if self.state != SessionState::Active {
            debug!(state = %self.state, "Dropping {} byte telephony chunk", chunk.len());
            self.stats.dropped_chunks += 1;
            return None;
        }

        match Self::telephony_chunk_to_frame(chunk) {
            Ok(frame) => {
                self.stats.chunks_to_backend += 1;
                Some(frame)
            }
            Err(e) => {
                warn!("Dropping telephony chunk: {}", e);
                self.stats.dropped_chunks += 1;
                None
            }
        }
    }

    fn telephony_chunk_to_frame(chunk: &[u8]) -> BridgeResult<String> {
        if chunk.is_empty() {
            return Err(BridgeError::AudioPayload("empty chunk".to_string()));
        }
        let pcm = codec::ulaw_to_pcm16(chunk);
        OutgoingFrame::Audio {
            audio: BASE64_STANDARD.encode(&pcm),
        }
        .to_json()
    }

    /// A text frame arrived from the backend.
    ///
    /// Returns μ-law bytes to write to telephony for `audio` frames. Malformed
    /// frames are logged and dropped; they never end the session.
    pub fn on_backend_text(&mut self, text: &str) -> Option<Bytes> {
        if self.state != SessionState::Active {
            debug!(state = %self.state, "Ignoring backend frame");
            return None;
        }

        let frame = match IncomingFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to parse backend frame: {}", e);
                self.stats.dropped_frames += 1;
                return None;
            }
        };

        match frame {
            IncomingFrame::Audio { audio } => match Self::backend_audio_to_ulaw(&audio) {
                Ok(ulaw) => {
                    self.stats.chunks_to_telephony += 1;
                    Some(ulaw)
                }
                Err(e) => {
                    warn!("Dropping backend audio: {}", e);
                    self.stats.dropped_frames += 1;
                    None
                }
            },
            IncomingFrame::StartAck => {
                info!("Backend acknowledged start");
                self.acknowledged = true;
                None
            }
            event @ IncomingFrame::Other { .. } => {
                info!(frame_type = event.frame_type(), "Backend event");
                self.stats.observed_frames += 1;
                None
            }
        }
    }

    fn backend_audio_to_ulaw(audio: &str) -> BridgeResult<Bytes> {
        let pcm = BASE64_STANDARD
            .decode(audio)
            .map_err(|e| BridgeError::AudioPayload(format!("invalid base64: {e}")))?;

        if pcm.len() < codec::PCM16_SAMPLE_BYTES {
            return Err(BridgeError::AudioPayload(format!(
                "{} byte payload holds no samples",
                pcm.len()
            )));
        }
        if pcm.len() % codec::PCM16_SAMPLE_BYTES != 0 {
            warn!(
                "Backend audio has odd length {}, trailing byte ignored",
                pcm.len()
            );
        }

        Ok(Bytes::from(codec::pcm16_to_ulaw(&pcm)))
    }

    /// A leg closed or failed.
    ///
    /// Returns the other leg when the caller must now close it. Subsequent
    /// calls return `None`, so each leg is closed at most once.
    pub fn on_leg_closed(&mut self, leg: Leg) -> Option<Leg> {
        let was_open = self.is_open(leg);
        self.mark_released(leg);

        if self.state == SessionState::Closed {
            return None;
        }

        if was_open {
            info!(leg = %leg, state = %self.state, "Leg closed");
        }

        let other = leg.other();
        if self.is_open(other) {
            if self.state != SessionState::Closing {
                self.state = SessionState::Closing;
                return Some(other);
            }
            None
        } else {
            self.state = SessionState::Closed;
            None
        }
    }

    /// The driver finished closing `leg` at this session's request.
    pub fn on_leg_released(&mut self, leg: Leg) {
        self.mark_released(leg);
        if !self.telephony_open && !self.backend_open {
            self.state = SessionState::Closed;
        }
    }

    fn mark_released(&mut self, leg: Leg) {
        match leg {
            Leg::Telephony => self.telephony_open = false,
            Leg::Backend => self.backend_open = false,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("telephony_open", &self.telephony_open)
            .field("backend_open", &self.backend_open)
            .field("acknowledged", &self.acknowledged)
            .field("stats", &self.stats)
            .finish()
    }
}
