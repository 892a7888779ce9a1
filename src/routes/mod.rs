pub mod api;
pub mod telephony;

use axum::Router;
use http::{HeaderValue, header};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;

/// Assemble the full application: health check, telephony WebSocket and
/// security headers.
pub fn create_app(state: Arc<AppState>) -> Router {
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    api::create_api_router()
        .merge(telephony::create_telephony_router(state.clone()))
        .with_state(state)
        .layer(security_headers)
}
