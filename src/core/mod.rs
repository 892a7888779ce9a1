pub mod bridge;
pub mod codec;

// Re-export commonly used types for convenience
pub use bridge::{
    AudioConfig, BridgeConfig, BridgeError, BridgeResult, IncomingFrame, Leg, OutgoingFrame,
    Session, SessionState, SessionStats,
};
pub use codec::{pcm16_to_ulaw, ulaw_to_pcm16};
