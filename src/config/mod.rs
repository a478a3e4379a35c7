//! Configuration module for the Hamsa TTS client
//!
//! Configuration comes from `.env` files, environment variables and an optional
//! YAML file. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `yaml`: YAML configuration file loading
//!
//! # Example
//! ```rust,no_run
//! use hamsa_tts::config::ClientConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ClientConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config = ClientConfig::from_file(&PathBuf::from("hamsa.yaml"))?;
//! println!("Using speaker {}", config.speaker);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;
use zeroize::Zeroize;

use crate::core::tts::{ConnectOptions, HAMSA_TTS_URL, HamsaSettings, HamsaTTSConfig};

mod env;
mod yaml;

pub use env::{
    HAMSA_DIALECT_ENV, HAMSA_ENDPOINT_ENV, HAMSA_MULAW_ENV, HAMSA_SPEAKER_ENV, HAMSA_TIMEOUT_ENV,
};
pub use yaml::{HamsaYaml, YamlConfig};

/// Default speaker when none is configured
pub const DEFAULT_SPEAKER: &str = "Majd";

/// Default connect timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Client configuration
///
/// Everything needed to build a [`HamsaTTSConfig`] and the per-request
/// [`ConnectOptions`].
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    /// Hamsa API key (`HAMSA_API_KEY`)
    pub api_key: Option<String>,
    pub speaker: String,
    pub dialect: Option<String>,
    /// Request mu-law instead of linear PCM
    pub mulaw: bool,
    pub endpoint: String,
    /// Connect-phase timeout applied to each request
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            speaker: DEFAULT_SPEAKER.to_string(),
            dialect: None,
            mulaw: false,
            endpoint: HAMSA_TTS_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("speaker", &self.speaker)
            .field("dialect", &self.dialect)
            .field("mulaw", &self.mulaw)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Wipe the API key from memory when the configuration is dropped.
impl Drop for ClientConfig {
    fn drop(&mut self) {
        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}

impl ClientConfig {
    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config = Self::from_lookup(|name| std::env::var(name).ok())?;
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
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_file_with(path, |name| std::env::var(name).ok())
    }

    pub(crate) fn from_file_with<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_lookup(lookup)?;
        YamlConfig::from_file(path)?.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speaker.trim().is_empty() {
            return Err(ConfigError::Invalid("speaker must not be empty".to_string()));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "endpoint".to_string(),
            value: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn settings(&self) -> HamsaSettings {
        let settings = HamsaSettings::new(self.speaker.clone()).with_mulaw(self.mulaw);
        match &self.dialect {
            Some(dialect) => settings.with_dialect(dialect.clone()),
            None => settings,
        }
    }

    pub fn to_tts_config(&self) -> HamsaTTSConfig {
        let mut config = HamsaTTSConfig::new(self.settings()).with_endpoint(self.endpoint.clone());
        config.api_key = self.api_key.clone();
        config
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::default().with_timeout(Duration::from_secs(self.timeout_seconds))
    }
}
