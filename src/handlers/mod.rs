//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `telephony` - Telephony media WebSocket bridged to the voice backend

pub mod api;
pub mod telephony;

pub use telephony::telephony_handler;
