//! Audio sample-format conversion between the telephony and backend legs.
//!
//! # Formats
//!
//! - Telephony: G.711 μ-law, one byte per sample
//! - Backend: PCM 16-bit signed little-endian, two bytes per sample
//!
//! Both converters are pure and stateless; chunks may be of any length and
//! need not align to a frame size.

mod mulaw;

pub use mulaw::{
    MULAW_BIAS, MULAW_MAX, MULAW_SILENCE, PCM16_SAMPLE_BYTES, decode_sample, encode_sample,
    pcm16_to_ulaw, segment, ulaw_to_pcm16,
};
