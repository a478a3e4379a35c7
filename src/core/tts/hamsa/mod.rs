//! Hamsa TTS provider module.
//!
//! This module provides streaming text-to-speech using Hamsa's HTTP streaming
//! endpoint. The service answers a single POST with a chunked body of raw audio,
//! which is relayed to an [`AudioEmitter`](crate::core::tts::AudioEmitter) as it
//! arrives; nothing is decoded or resampled.
//!
//! # Audio Format
//!
//! 22050 Hz, mono, 16-bit linear PCM (or 8-bit mu-law with `mulaw = true`)
//!
//! # Example
//!
//! ```rust,ignore
//! use hamsa_tts::core::tts::{BaseTTS, ChunkedStream, ConnectOptions, HamsaSettings, HamsaTTS, HamsaTTSConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Falls back to HAMSA_API_KEY when no key is given
//!     let config = HamsaTTSConfig::new(HamsaSettings::new("Majd").with_dialect("pls"));
//!     let tts = HamsaTTS::new(config).unwrap();
//!
//!     let session = tts.synthesize("مرحباً بكم جميعاً في همسة!", ConnectOptions::default()).unwrap();
//!     session.run(&mut my_emitter).await.unwrap();
//!     tts.close().await;
//! }
//! ```

mod config;
mod provider;
mod stream;

pub use config::{
    HAMSA_API_KEY_ENV, HAMSA_CHUNK_SIZE, HAMSA_MIME_TYPE, HAMSA_NUM_CHANNELS, HAMSA_SAMPLE_RATE,
    HAMSA_TTS_URL, HamsaCredentials, HamsaRequest, HamsaSettings, HamsaTTSConfig,
};
pub use provider::HamsaTTS;
pub use stream::HamsaChunkedStream;
