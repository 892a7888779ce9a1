//! Configuration module for the telephony bridge
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use telephony_bridge::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;

use crate::core::bridge::{AudioConfig, BridgeConfig};

mod env;
mod merge;
mod validation;
mod yaml;

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains everything needed to run the bridge:
/// - Listener settings (host, port, TLS)
/// - Voice backend endpoint and credentials
/// - The audio format advertised to the backend
/// - Admission limits
#[derive(Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Voice backend
    pub backend_url: String,
    pub backend_api_key: String,
    pub backend_assistant_id: String,
    /// `audioConfig` sent in the start frame; `None` omits it
    pub backend_audio: Option<AudioConfig>,

    /// Maximum concurrent telephony sessions (None = unlimited)
    pub max_sessions: Option<usize>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("backend_url", &self.backend_url)
            .field("backend_api_key", &"<redacted>")
            .field("backend_assistant_id", &self.backend_assistant_id)
            .field("backend_audio", &self.backend_audio)
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}

/// Zeroize the backend credential when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.backend_api_key.zeroize();
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// The `.env` file is loaded by the binary before this is called, so its
    /// values are visible here unless shadowed by real environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation fails
    /// (for example `VAPI_API_KEY` is missing).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        validation::validate_backend(
            &self.backend_url,
            &self.backend_api_key,
            &self.backend_assistant_id,
        )?;
        validation::validate_backend_audio(&self.backend_audio)?;
        validation::validate_max_sessions(self.max_sessions)?;
        Ok(())
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Build the per-session bridge configuration.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new(
            self.backend_url.clone(),
            self.backend_api_key.clone(),
            self.backend_assistant_id.clone(),
        )
        .with_audio_config(self.backend_audio.clone())
    }
}
