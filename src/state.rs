//! Shared application state.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::ServerConfig;
use crate::core::bridge::BridgeConfig;

/// Reasons a new session is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLimitError {
    GlobalLimitReached,
}

/// Application state shared by all handlers.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    /// Session factory configuration, handed to every new session
    pub bridge: Arc<BridgeConfig>,
    active_sessions: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let bridge = Arc::new(config.bridge_config());
        Arc::new(Self {
            config,
            bridge,
            active_sessions: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Number of sessions currently holding a permit.
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }

    /// Reserve a session slot.
    ///
    /// The slot is released when the returned permit (and every clone of it)
    /// is dropped.
    pub fn try_acquire_session(&self) -> Result<SessionPermit, SessionLimitError> {
        let max = self.config.max_sessions;
        let acquired = self
            .active_sessions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| match max {
                Some(limit) if current >= limit => None,
                _ => Some(current + 1),
            });

        match acquired {
            Ok(_) => Ok(SessionPermit {
                _slot: Arc::new(SessionSlot {
                    counter: self.active_sessions.clone(),
                }),
            }),
            Err(_) => Err(SessionLimitError::GlobalLimitReached),
        }
    }
}

#[derive(Debug)]
struct SessionSlot {
    counter: Arc<AtomicUsize>,
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A reserved session slot.
///
/// Cloneable so it can travel as a request extension; the slot is held until
/// the last clone is dropped.
#[derive(Debug, Clone)]
pub struct SessionPermit {
    _slot: Arc<SessionSlot>,
}
