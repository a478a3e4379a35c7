//! # TTS Base Contract
//!
//! This module defines the provider-independent pieces of the synthesis pipeline:
//! the error taxonomy, connection options, capability descriptor, the audio sink
//! (`AudioEmitter`) that receives relayed bytes, and the `BaseTTS` trait every
//! provider implements.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use hamsa_tts::core::tts::{AudioEmitter, BaseTTS, ChunkedStream, ConnectOptions};
//! use bytes::Bytes;
//!
//! struct PrintEmitter;
//!
//! impl AudioEmitter for PrintEmitter {
//!     fn initialize(&mut self, request_id: &str, sample_rate: u32, num_channels: u16, mime_type: &str) {
//!         println!("{request_id}: {sample_rate} Hz x{num_channels} ({mime_type})");
//!     }
//!     fn push(&mut self, data: Bytes) {
//!         println!("received {} bytes", data.len());
//!     }
//!     fn flush(&mut self) {
//!         println!("done");
//!     }
//! }
//!
//! async fn speak(tts: &impl BaseTTS<Chunked = impl ChunkedStream>) -> hamsa_tts::TTSResult<()> {
//!     let session = tts.synthesize("Hello", ConnectOptions::default())?;
//!     session.run(&mut PrintEmitter).await
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Boxed error used to preserve the low-level cause of transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// TTS-specific error types
///
/// `Status`, `Timeout` and `Connection` are the three ways a single synthesis
/// attempt can fail; they are mutually exclusive per attempt.
#[derive(Debug, thiserror::Error)]
pub enum TTSError {
    /// The service answered with a non-200 status
    #[error("API status error ({status_code}): {body}")]
    Status { status_code: u16, body: String },

    /// Connection establishment timed out
    #[error("Timeout error: {0}")]
    Timeout(#[source] BoxError),

    /// Any other transport failure: DNS, TLS, reset, I/O
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The session was aborted before it completed
    #[error("Synthesis cancelled")]
    Cancelled,
}

impl TTSError {
    /// Whether a caller-side retry policy may attempt the request again.
    ///
    /// The pipeline itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            TTSError::Timeout(_) | TTSError::Connection(_) => true,
            TTSError::Status { status_code, .. } => {
                matches!(status_code, 408 | 429) || *status_code >= 500
            }
            TTSError::InvalidConfiguration(_) | TTSError::Unsupported(_) | TTSError::Cancelled => {
                false
            }
        }
    }

    /// Status code carried by a `Status` error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TTSError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TTSError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TTSError::Timeout(Box::new(err))
        } else {
            TTSError::Connection(Box::new(err))
        }
    }
}

/// Result type for TTS operations
pub type TTSResult<T> = Result<T, TTSError>;

/// Per-request connection options supplied by the caller.
///
/// Only `timeout` is enforced by the pipeline, and only for connection
/// establishment. `max_retry` and `retry_interval` are carried for the caller's
/// own retry policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectOptions {
    pub max_retry: u32,
    pub retry_interval: Duration,
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_retry: 3,
            retry_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a provider can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TTSCapabilities {
    /// Audio is delivered incrementally while the utterance is synthesized
    pub streaming: bool,
    /// Word-level timing metadata is available
    pub aligned_transcript: bool,
}

/// Sink receiving the audio of one synthesis session.
///
/// A session calls `initialize` once, `push` zero or more times in receipt
/// order, and `flush` once on clean completion. A failed session never calls
/// `flush`; whatever was pushed before the failure should be discarded.
pub trait AudioEmitter: Send {
    fn initialize(&mut self, request_id: &str, sample_rate: u32, num_channels: u16, mime_type: &str);

    fn push(&mut self, data: Bytes);

    fn flush(&mut self);

    /// Timed transcript for providers with aligned transcripts
    fn push_timed_transcript(&mut self, _text: &str, _start_time: f64, _end_time: f64) {}

    fn start_segment(&mut self, _segment_id: &str) {}

    fn end_segment(&mut self) {}

    fn end_input(&mut self) {}
}

/// Event produced by the pull-based view of a synthesis session
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizedAudio {
    /// Session metadata, emitted before the request is sent
    Started {
        request_id: String,
        sample_rate: u32,
        num_channels: u16,
        mime_type: &'static str,
    },
    /// Raw audio bytes, in receipt order
    Chunk(Bytes),
    /// The response body was fully relayed
    Finished,
}

/// One-shot synthesis session: one request, one streamed response.
#[async_trait]
pub trait ChunkedStream: Send {
    fn input_text(&self) -> &str;

    fn request_id(&self) -> &str;

    /// Run the session to completion, relaying audio into `emitter`.
    async fn run(self, emitter: &mut dyn AudioEmitter) -> TTSResult<()>;
}

/// Duplex session where text is pushed while audio streams back
pub trait SynthesizeStream: Send {
    fn push_text(&mut self, text: &str) -> TTSResult<()>;

    fn flush(&mut self) -> TTSResult<()>;

    fn end_input(&mut self) -> TTSResult<()>;
}

/// Base trait for Text-to-Speech providers
#[async_trait]
pub trait BaseTTS: Send + Sync {
    /// Session type returned by `synthesize`
    type Chunked: ChunkedStream;

    fn capabilities(&self) -> TTSCapabilities;

    fn sample_rate(&self) -> u32;

    fn num_channels(&self) -> u16;

    /// Create a one-shot session for `text`.
    ///
    /// No network activity happens until the session is run.
    fn synthesize(&self, text: &str, conn_options: ConnectOptions) -> TTSResult<Self::Chunked>;

    /// Open a duplex session. Providers without a duplex protocol must fail here.
    fn stream(&self, conn_options: ConnectOptions) -> TTSResult<Box<dyn SynthesizeStream>>;

    /// Abort every active session and release network resources.
    ///
    /// Sessions are signalled, not awaited: each one stops at its next await
    /// point, possibly after `close` has returned. Safe to call more than once.
    async fn close(&self);

    fn get_provider_info(&self) -> serde_json::Value;
}
