//! Telephony WebSocket route configuration

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::telephony_handler;
use crate::middleware::session_limit_middleware;
use crate::state::AppState;
use std::sync::Arc;

/// Create the telephony WebSocket router
///
/// # Endpoint
///
/// `GET /ws` - WebSocket upgrade for a telephony media stream
///
/// # Protocol
///
/// After the upgrade the caller streams binary μ-law frames and receives
/// binary μ-law frames back. Upgrades beyond the configured session limit
/// are refused with 503.
pub fn create_telephony_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ws", get(telephony_handler))
        .layer(middleware::from_fn_with_state(
            state,
            session_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
