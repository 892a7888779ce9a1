//! Configuration validation.

use crate::core::bridge::AudioConfig;
use crate::utils::url_validation::validate_websocket_url;

/// The backend credentials are required and the URL must be a WebSocket URL.
pub(crate) fn validate_backend(
    url: &str,
    api_key: &str,
    assistant_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if api_key.trim().is_empty() {
        return Err("VAPI_API_KEY is required (or backend.api_key in YAML)".into());
    }
    if assistant_id.trim().is_empty() {
        return Err("VAPI_ASSISTANT_ID is required (or backend.assistant_id in YAML)".into());
    }
    validate_websocket_url(url).map_err(|e| format!("Invalid backend URL '{url}': {e}"))?;
    Ok(())
}

pub(crate) fn validate_backend_audio(
    audio: &Option<AudioConfig>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(audio) = audio {
        if audio.sample_rate == 0 {
            return Err("Backend sample rate must be greater than zero".into());
        }
        if audio.encoding.trim().is_empty() {
            return Err("Backend audio encoding must not be empty".into());
        }
    }
    Ok(())
}

pub(crate) fn validate_max_sessions(
    max_sessions: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    if max_sessions == Some(0) {
        return Err("MAX_SESSIONS must be greater than zero when set".into());
    }
    Ok(())
}
