//! Telephony media WebSocket handler
//!
//! Each accepted connection is one call. The handler opens a connection to
//! the voice backend and relays audio in both directions until either side
//! goes away.
//!
//! # Protocol
//!
//! ## Telephony → Server
//!
//! - **Binary frames**: raw μ-law audio (8-bit, 8 kHz, mono), any length
//! - Text frames are ignored
//!
//! ## Server → Telephony
//!
//! - **Binary frames**: μ-law audio converted from the backend's PCM16
//!
//! Closing either side closes the other.

mod handler;

pub use handler::telephony_handler;

use bytes::Bytes;

/// Writes queued for the telephony leg.
#[derive(Debug)]
pub enum TelephonyRoute {
    /// μ-law audio for the caller
    Audio(Bytes),
    /// Send a close frame and stop writing
    Close,
}
