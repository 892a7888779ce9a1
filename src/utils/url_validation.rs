//! WebSocket endpoint URL validation
//!
//! Checked once at startup so a misconfigured backend URL fails the process
//! instead of every call.

use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation
#[derive(Debug, Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be ws or wss, got: {0}")]
    WebSocketSchemeRequired(String),

    #[error("URL must have a host")]
    MissingHost,
}

/// Validates a WebSocket endpoint URL.
///
/// # Example
/// ```rust
/// use telephony_bridge::utils::url_validation::validate_websocket_url;
///
/// assert!(validate_websocket_url("wss://api.vapi.ai/audio-websocket").is_ok());
/// assert!(validate_websocket_url("ws://127.0.0.1:9000").is_ok());
/// assert!(validate_websocket_url("https://api.vapi.ai").is_err());
/// ```
pub fn validate_websocket_url(url: &str) -> Result<Url, UrlValidationError> {
    let parsed = Url::parse(url)?;

    match parsed.scheme() {
        "ws" | "wss" => {}
        other => return Err(UrlValidationError::WebSocketSchemeRequired(other.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed)
}
