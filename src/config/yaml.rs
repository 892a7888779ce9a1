use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///   tls:
///     cert_path: "/etc/bridge/cert.pem"
///     key_path: "/etc/bridge/key.pem"
///
/// backend:
///   url: "wss://api.vapi.ai/audio-websocket"
///   api_key: "your-api-key"
///   assistant_id: "your-assistant-id"
///   audio:
///     enabled: true
///     sample_rate: 16000
///     encoding: "LINEAR16"
///
/// limits:
///   max_sessions: 200
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub backend: Option<BackendYaml>,
    pub limits: Option<LimitsYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Voice backend configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BackendYaml {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub assistant_id: Option<String>,
    pub audio: Option<BackendAudioYaml>,
}

/// `audioConfig` advertised in the start frame
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BackendAudioYaml {
    /// Set to false to omit `audioConfig` from the start frame
    pub enabled: Option<bool>,
    pub sample_rate: Option<u32>,
    pub encoding: Option<String>,
}

/// Capacity limits from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LimitsYaml {
    pub max_sessions: Option<usize>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  tls:
    cert_path: "/tmp/cert.pem"
    key_path: "/tmp/key.pem"

backend:
  url: "ws://localhost:9000/audio"
  api_key: "yaml-key"
  assistant_id: "yaml-assistant"
  audio:
    enabled: true
    sample_rate: 24000
    encoding: "LINEAR16"

limits:
  max_sessions: 50
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));
        let tls = server.tls.as_ref().unwrap();
        assert_eq!(tls.cert_path.as_deref(), Some("/tmp/cert.pem"));
        assert_eq!(tls.key_path.as_deref(), Some("/tmp/key.pem"));

        let backend = config.backend.as_ref().unwrap();
        assert_eq!(backend.url.as_deref(), Some("ws://localhost:9000/audio"));
        assert_eq!(backend.api_key.as_deref(), Some("yaml-key"));
        assert_eq!(backend.assistant_id.as_deref(), Some("yaml-assistant"));
        let audio = backend.audio.as_ref().unwrap();
        assert_eq!(audio.enabled, Some(true));
        assert_eq!(audio.sample_rate, Some(24000));

        assert_eq!(config.limits.as_ref().unwrap().max_sessions, Some(50));
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
server:
  port: 9000
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.server.as_ref().unwrap().host.is_none());
        assert_eq!(config.server.as_ref().unwrap().port, Some(9000));
        assert!(config.backend.is_none());
        assert!(config.limits.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("").unwrap();

        assert!(config.server.is_none());
        assert!(config.backend.is_none());
        assert!(config.limits.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let yaml_content = r#"
backend:
  assistant_id: "from-file"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.backend.unwrap().assistant_id.as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/bridge.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
