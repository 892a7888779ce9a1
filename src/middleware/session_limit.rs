//! Session admission middleware for the telephony WebSocket
//!
//! # Example
//!
//! ```ignore
//! use axum::Router;
//! use telephony_bridge::middleware::session_limit_middleware;
//!
//! let app = Router::new()
//!     .route("/ws", get(telephony_handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         state.clone(),
//!         session_limit_middleware,
//!     ));
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::{AppState, SessionLimitError};

/// Middleware that enforces the concurrent session limit.
///
/// Only WebSocket upgrade requests are counted; other requests pass through.
/// On success a [`crate::state::SessionPermit`] is inserted as a request
/// extension and the handler keeps it for the lifetime of the session. When
/// the limit is reached the upgrade is refused with 503 Service Unavailable.
pub async fn session_limit_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !is_websocket_upgrade(&request) {
        return next.run(request).await;
    }

    match state.try_acquire_session() {
        Ok(permit) => {
            request.extensions_mut().insert(permit);
            next.run(request).await
        }
        Err(SessionLimitError::GlobalLimitReached) => {
            tracing::warn!(
                active = state.active_sessions(),
                "Rejecting telephony connection: session limit reached"
            );
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Server at capacity. Please try again later.",
            )
                .into_response()
        }
    }
}

fn is_websocket_upgrade(request: &Request<Body>) -> bool {
    request
        .headers()
        .get(header::UPGRADE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false)
}
