//! Hamsa TTS Configuration
//!
//! Voice settings, credentials and the wire request body for the Hamsa
//! streaming endpoint.

use std::fmt;

use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::tts::base::{TTSError, TTSResult};
use crate::utils::req_manager::HttpClientConfig;

/// Hamsa streaming TTS endpoint
pub const HAMSA_TTS_URL: &str = "https://api.tryhamsa.com/v1/realtime/tts-stream";

/// Environment variable consulted when no API key is passed explicitly
pub const HAMSA_API_KEY_ENV: &str = "HAMSA_API_KEY";

/// Output sample rate of the service (Hz)
pub const HAMSA_SAMPLE_RATE: u32 = 22_050;

/// The service always produces mono audio
pub const HAMSA_NUM_CHANNELS: u16 = 1;

pub const HAMSA_MIME_TYPE: &str = "audio/pcm";

/// Upper bound on the size of a single pushed chunk
pub const HAMSA_CHUNK_SIZE: usize = 4096;

/// Voice parameters for Hamsa synthesis.
///
/// Immutable once built; an empty dialect is treated as no dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HamsaSettings {
    speaker: String,
    dialect: Option<String>,
    mulaw: bool,
}

impl HamsaSettings {
    pub fn new(speaker: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            dialect: None,
            mulaw: false,
        }
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        let dialect = dialect.into();
        self.dialect = (!dialect.is_empty()).then_some(dialect);
        self
    }

    /// Request 8-bit mu-law instead of 16-bit linear PCM
    pub fn with_mulaw(mut self, mulaw: bool) -> Self {
        self.mulaw = mulaw;
        self
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref()
    }

    pub fn mulaw(&self) -> bool {
        self.mulaw
    }

    /// Build the JSON request body for `text`.
    ///
    /// Text is forwarded as-is, including an empty string.
    pub fn as_request_json<'a>(&'a self, text: &'a str) -> HamsaRequest<'a> {
        HamsaRequest {
            text,
            speaker: &self.speaker,
            mulaw: self.mulaw,
            dialect: self.dialect.as_deref().filter(|d| !d.is_empty()),
        }
    }
}

/// Hamsa TTS request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HamsaRequest<'a> {
    pub text: &'a str,
    pub speaker: &'a str,
    pub mulaw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<&'a str>,
}

/// API credentials, wiped from memory on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct HamsaCredentials {
    api_key: String,
}

impl HamsaCredentials {
    /// Resolve credentials from an explicit key or `HAMSA_API_KEY`.
    pub fn resolve(explicit: Option<&str>) -> TTSResult<Self> {
        Self::resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// Resolve credentials using `lookup` for the environment fallback.
    ///
    /// An explicit non-empty key wins; otherwise the variable named
    /// [`HAMSA_API_KEY_ENV`] is read once.
    pub fn resolve_with<F>(explicit: Option<&str>, lookup: F) -> TTSResult<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let api_key = match explicit.filter(|key| !key.is_empty()) {
            Some(key) => key.to_string(),
            None => lookup(HAMSA_API_KEY_ENV).unwrap_or_default(),
        };

        if api_key.trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(format!(
                "Hamsa API key is required. Provide `api_key` or set {HAMSA_API_KEY_ENV}"
            )));
        }

        Ok(Self { api_key })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Value of the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Token {}", self.api_key)
    }
}

impl fmt::Debug for HamsaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HamsaCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to construct a Hamsa synthesizer
#[derive(Debug, Clone)]
pub struct HamsaTTSConfig {
    /// Explicit API key; `None` falls back to `HAMSA_API_KEY`
    pub api_key: Option<String>,
    pub settings: HamsaSettings,
    pub endpoint: String,
    /// Settings for the privately owned HTTP client
    pub http: HttpClientConfig,
}

impl HamsaTTSConfig {
    pub fn new(settings: HamsaSettings) -> Self {
        Self {
            api_key: None,
            settings,
            endpoint: HAMSA_TTS_URL.to_string(),
            http: HttpClientConfig::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Drop for HamsaTTSConfig {
    fn drop(&mut self) {
        if let Some(ref mut key) = self.api_key {
            key.zeroize();
        }
    }
}
