//! Merging environment variables with YAML overrides.

use std::path::PathBuf;

use super::env::EnvConfig;
use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig};
use crate::core::bridge::{
    AudioConfig, DEFAULT_BACKEND_ENCODING, DEFAULT_BACKEND_SAMPLE_RATE, DEFAULT_BACKEND_URL,
};

pub(crate) const DEFAULT_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_PORT: u16 = 3000;

/// Build a [`ServerConfig`] from the environment, with YAML values taking
/// priority when a file was given.
pub(crate) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();

    let server = yaml.server.unwrap_or_default();
    let backend = yaml.backend.unwrap_or_default();
    let audio = backend.audio.unwrap_or_default();
    let limits = yaml.limits.unwrap_or_default();
    let tls = server.tls.unwrap_or_default();

    let host = server
        .host
        .or(env.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = server.port.or(env.port).unwrap_or(DEFAULT_PORT);

    let tls = match (
        tls.cert_path.or(env.tls_cert_path),
        tls.key_path.or(env.tls_key_path),
    ) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => {
            return Err(
                "TLS requires both TLS_CERT_PATH and TLS_KEY_PATH (or server.tls.cert_path and server.tls.key_path)"
                    .into(),
            );
        }
    };

    let send_audio_config = audio.enabled.or(env.send_audio_config).unwrap_or(true);
    let backend_audio = send_audio_config.then(|| AudioConfig {
        sample_rate: audio
            .sample_rate
            .or(env.sample_rate)
            .unwrap_or(DEFAULT_BACKEND_SAMPLE_RATE),
        encoding: audio
            .encoding
            .or(env.audio_encoding)
            .unwrap_or_else(|| DEFAULT_BACKEND_ENCODING.to_string()),
    });

    Ok(ServerConfig {
        host,
        port,
        tls,
        backend_url: backend
            .url
            .or(env.backend_url)
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string()),
        backend_api_key: backend.api_key.or(env.api_key).unwrap_or_default(),
        backend_assistant_id: backend
            .assistant_id
            .or(env.assistant_id)
            .unwrap_or_default(),
        backend_audio,
        max_sessions: limits.max_sessions.or(env.max_sessions),
    })
}
