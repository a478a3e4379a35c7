//! Hamsa TTS provider implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.tryhamsa.com/v1/realtime/tts-stream`
//! - Auth: `Authorization: Token <api_key>`
//! - Body: `{"text", "speaker", "mulaw", "dialect"?}`
//! - Output: raw 16-bit linear PCM (or 8-bit mu-law), 22050 Hz, mono

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::config::{
    HAMSA_NUM_CHANNELS, HAMSA_SAMPLE_RATE, HAMSA_TTS_URL, HamsaCredentials, HamsaSettings,
    HamsaTTSConfig,
};
use super::stream::{HamsaChunkedStream, SessionOptions};
use crate::core::tts::base::{
    BaseTTS, ConnectOptions, SynthesizeStream, TTSCapabilities, TTSError, TTSResult,
};
use crate::core::tts::registry::SessionRegistry;
use crate::utils::req_manager::{ConnectionClosed, HttpSessionManager, RequestMetrics};

/// Hamsa TTS synthesizer.
///
/// Resolves credentials at construction, hands out one [`HamsaChunkedStream`]
/// per utterance and tracks every session it created so [`BaseTTS::close`]
/// can abort them. Shareable across tasks.
///
/// # Example
///
/// ```rust,ignore
/// use hamsa_tts::core::tts::{BaseTTS, ChunkedStream, ConnectOptions, HamsaSettings, HamsaTTS, HamsaTTSConfig};
///
/// #[tokio::main]
/// async fn main() -> hamsa_tts::TTSResult<()> {
///     let config = HamsaTTSConfig::new(HamsaSettings::new("Majd").with_dialect("pls"))
///         .with_api_key("your-api-key");
///     let tts = HamsaTTS::new(config)?;
///
///     let session = tts.synthesize("مرحباً بكم", ConnectOptions::default())?;
///     session.run(&mut my_emitter).await?;
///
///     tts.close().await;
///     Ok(())
/// }
/// ```
pub struct HamsaTTS {
    pub(super) opts: SessionOptions,
    pub(super) connections: Arc<HttpSessionManager>,
    sessions: SessionRegistry,
    closed: AtomicBool,
}

impl HamsaTTS {
    /// Create a synthesizer that builds its own HTTP client on first use
    pub fn new(config: HamsaTTSConfig) -> TTSResult<Self> {
        Self::build(config, None)
    }

    /// Create a synthesizer that reuses a caller-owned HTTP client.
    ///
    /// The client is never closed by this synthesizer.
    pub fn with_http_client(config: HamsaTTSConfig, client: reqwest::Client) -> TTSResult<Self> {
        Self::build(config, Some(client))
    }

    fn build(config: HamsaTTSConfig, client: Option<reqwest::Client>) -> TTSResult<Self> {
        let credentials = HamsaCredentials::resolve(config.api_key.as_deref())?;

        if config.settings.speaker().trim().is_empty() {
            return Err(TTSError::InvalidConfiguration(
                "Hamsa speaker must not be empty".to_string(),
            ));
        }

        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            TTSError::InvalidConfiguration(format!(
                "Invalid Hamsa endpoint '{}': {}",
                config.endpoint, e
            ))
        })?;

        debug!(
            speaker = %config.settings.speaker(),
            dialect = ?config.settings.dialect(),
            mulaw = config.settings.mulaw(),
            external_client = client.is_some(),
            "Creating Hamsa TTS"
        );

        Ok(Self {
            opts: SessionOptions {
                credentials,
                settings: config.settings.clone(),
                endpoint,
                sample_rate: HAMSA_SAMPLE_RATE,
            },
            connections: Arc::new(HttpSessionManager::new(client, config.http.clone())),
            sessions: SessionRegistry::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn settings(&self) -> &HamsaSettings {
        &self.opts.settings
    }

    pub fn endpoint(&self) -> &Url {
        &self.opts.endpoint
    }

    /// Number of sessions created and not yet dropped
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn connection_metrics(&self) -> &RequestMetrics {
        self.connections.metrics()
    }
}

#[async_trait]
impl BaseTTS for HamsaTTS {
    type Chunked = HamsaChunkedStream;

    fn capabilities(&self) -> TTSCapabilities {
        TTSCapabilities {
            streaming: true,
            aligned_transcript: false,
        }
    }

    fn sample_rate(&self) -> u32 {
        self.opts.sample_rate
    }

    fn num_channels(&self) -> u16 {
        HAMSA_NUM_CHANNELS
    }

    fn synthesize(&self, text: &str, conn_options: ConnectOptions) -> TTSResult<HamsaChunkedStream> {
        if self.is_closed() {
            return Err(TTSError::Connection(Box::new(ConnectionClosed)));
        }

        let request_id = Uuid::new_v4().simple().to_string()[..12].to_string();
        let (guard, cancel_token) = self.sessions.register(&request_id);

        debug!(
            request_id = %request_id,
            active_sessions = self.sessions.len(),
            "Created Hamsa TTS session"
        );

        Ok(HamsaChunkedStream::new(
            text.to_string(),
            self.opts.clone(),
            conn_options,
            Arc::clone(&self.connections),
            request_id,
            cancel_token,
            guard,
        ))
    }

    fn stream(&self, _conn_options: ConnectOptions) -> TTSResult<Box<dyn SynthesizeStream>> {
        Err(TTSError::Unsupported(
            "Hamsa exposes HTTP streaming only; duplex streaming is not available".to_string(),
        ))
    }

    /// Cancel every live session, then release the owned client.
    ///
    /// Does not wait for sessions to wind down. In-flight sessions keep their
    /// client handle until they observe the cancellation.
    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("Hamsa TTS already closed");
            return;
        }

        let cancelled = self.sessions.cancel_all();
        let released = self.connections.close();
        self.sessions.clear();

        info!(
            cancelled_sessions = cancelled,
            released_client = released,
            "Hamsa TTS closed"
        );
    }

    fn get_provider_info(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": "hamsa",
            "version": "1.0.0",
            "api_type": "HTTP streaming",
            "connection_pooling": true,
            "capabilities": self.capabilities(),
            "supported_formats": ["pcm", "mulaw"],
            "default_sample_rate": HAMSA_SAMPLE_RATE,
            "num_channels": HAMSA_NUM_CHANNELS,
            "endpoint": self.opts.endpoint.as_str(),
            "default_endpoint": HAMSA_TTS_URL,
        })
    }
}
