//! Environment variable loading.
//!
//! Every value is optional at this layer; defaults and requirements are
//! applied by [`super::merge`] and [`super::validation`].

use std::env;
use std::str::FromStr;

/// Raw values read from the process environment.
#[derive(Debug, Clone, Default)]
pub(crate) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    pub backend_url: Option<String>,
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
    pub send_audio_config: Option<bool>,
    pub sample_rate: Option<u32>,
    pub audio_encoding: Option<String>,
    pub max_sessions: Option<usize>,
}

impl EnvConfig {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            host: env_string("HOST"),
            port: env_parse("PORT")?,
            tls_cert_path: env_string("TLS_CERT_PATH"),
            tls_key_path: env_string("TLS_KEY_PATH"),
            backend_url: env_string("VAPI_WEBSOCKET_URL"),
            api_key: env_string("VAPI_API_KEY"),
            assistant_id: env_string("VAPI_ASSISTANT_ID"),
            send_audio_config: env_bool("BACKEND_SEND_AUDIO_CONFIG")?,
            sample_rate: env_parse("BACKEND_SAMPLE_RATE")?,
            audio_encoding: env_string("BACKEND_AUDIO_ENCODING"),
            max_sessions: env_parse("MAX_SESSIONS")?,
        })
    }
}

/// Read a variable, treating empty values as unset.
fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {key}: '{raw}' ({e})").into()),
        None => Ok(None),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, Box<dyn std::error::Error>> {
    match env_string(key) {
        Some(raw) => parse_bool(&raw)
            .map(Some)
            .ok_or_else(|| format!("Invalid boolean for {key}: '{raw}'").into()),
        None => Ok(None),
    }
}

/// Parse the boolean spellings accepted in environment files.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
