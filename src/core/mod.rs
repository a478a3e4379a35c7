pub mod tts;

// Re-export commonly used types for convenience
pub use tts::{
    AudioEmitter, BaseTTS, ChunkedStream, ConnectOptions, HamsaChunkedStream, HamsaSettings,
    HamsaTTS, HamsaTTSConfig, SynthesizedAudio, TTSCapabilities, TTSError, TTSResult,
};
