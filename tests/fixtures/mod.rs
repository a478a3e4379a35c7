//! Test Fixtures Module
//!
//! Shared helpers for the Hamsa TTS integration tests:
//! - A recording audio emitter
//! - Raw TCP servers for transport cases wiremock cannot express

// Allow dead code in test fixtures - not every test binary uses every helper
#![allow(dead_code)]

pub mod emitter;
pub mod raw_server;

pub use emitter::*;
pub use raw_server::*;

use hamsa_tts::{HamsaSettings, HamsaTTSConfig};

pub const TEST_API_KEY: &str = "test-key";
pub const TTS_PATH: &str = "/v1/realtime/tts-stream";

/// Config pointing at a local test server
pub fn local_config(base_url: &str) -> HamsaTTSConfig {
    HamsaTTSConfig::new(HamsaSettings::new("Majd").with_dialect("pls"))
        .with_api_key(TEST_API_KEY)
        .with_endpoint(format!("{base_url}{TTS_PATH}"))
}

/// Deterministic pseudo-audio payload
pub fn audio_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
