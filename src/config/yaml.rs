use std::path::Path;

use serde::Deserialize;

use super::{ClientConfig, ConfigError};

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// hamsa:
///   api_key: "your-api-key"
///   speaker: "Majd"
///   dialect: "pls"
///   mulaw: false
///   endpoint: "https://api.tryhamsa.com/v1/realtime/tts-stream"
///   timeout_seconds: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub hamsa: Option<HamsaYaml>,
}

/// Hamsa configuration from YAML
#[derive(Clone, Deserialize, Default)]
#[serde(default)]
pub struct HamsaYaml {
    pub api_key: Option<String>,
    pub speaker: Option<String>,
    pub dialect: Option<String>,
    pub mulaw: Option<bool>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl std::fmt::Debug for HamsaYaml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HamsaYaml")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("speaker", &self.speaker)
            .field("dialect", &self.dialect)
            .field("mulaw", &self.mulaw)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl YamlConfig {
    /// Load YAML configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Overlay the values present in this file onto `config`
    pub fn apply(self, config: &mut ClientConfig) {
        let Some(hamsa) = self.hamsa else {
            return;
        };

        if let Some(api_key) = hamsa.api_key {
            config.api_key = Some(api_key);
        }
        if let Some(speaker) = hamsa.speaker {
            config.speaker = speaker;
        }
        if let Some(dialect) = hamsa.dialect {
            config.dialect = (!dialect.is_empty()).then_some(dialect);
        }
        if let Some(mulaw) = hamsa.mulaw {
            config.mulaw = mulaw;
        }
        if let Some(endpoint) = hamsa.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(timeout_seconds) = hamsa.timeout_seconds {
            config.timeout_seconds = timeout_seconds;
        }
    }
}
