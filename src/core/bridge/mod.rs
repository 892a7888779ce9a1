//! Telephony ↔ voice backend bridging.
//!
//! # Architecture
//!
//! - [`Session`] - per-call state machine and frame translation, no I/O
//! - [`backend`] - outbound WebSocket to the voice backend
//! - [`IncomingFrame`] / [`OutgoingFrame`] - backend control frames
//! - [`BridgeConfig`] - credentials and endpoint shared by all sessions
//!
//! The telephony side is served by [`crate::handlers::telephony`], which
//! drives a session per accepted connection.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use telephony_bridge::core::bridge::{BridgeConfig, Leg, Session, SessionState};
//!
//! let config = BridgeConfig::new("wss://api.vapi.ai/audio-websocket", "key", "assistant");
//! let mut session = Session::new(Arc::new(config));
//!
//! let start = session.on_backend_open().unwrap();
//! assert!(start.contains(r#""type":"start""#));
//! assert_eq!(session.state(), SessionState::Active);
//!
//! let frame = session.on_telephony_audio(&[0xFF; 160]).unwrap();
//! assert!(frame.contains(r#""type":"audio""#));
//!
//! assert_eq!(session.on_leg_closed(Leg::Telephony), Some(Leg::Backend));
//! ```

pub mod backend;
mod config;
mod error;
mod messages;
mod session;

pub use backend::{BackendRoute, BackendSource, BackendStream};
pub use config::{
    AudioConfig, BridgeConfig, DEFAULT_BACKEND_ENCODING, DEFAULT_BACKEND_SAMPLE_RATE,
    DEFAULT_BACKEND_URL,
};
pub use error::{BridgeError, BridgeResult};
pub use messages::{IncomingFrame, OutgoingFrame};
pub use session::{Leg, Session, SessionState, SessionStats};
