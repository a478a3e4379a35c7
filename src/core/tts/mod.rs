mod base;
pub mod hamsa;
pub(crate) mod registry;

pub use base::{
    AudioEmitter, BaseTTS, BoxError, ChunkedStream, ConnectOptions, SynthesizeStream, SynthesizedAudio,
    TTSCapabilities, TTSError, TTSResult,
};
pub use hamsa::{
    HAMSA_API_KEY_ENV, HAMSA_CHUNK_SIZE, HAMSA_MIME_TYPE, HAMSA_NUM_CHANNELS, HAMSA_SAMPLE_RATE,
    HAMSA_TTS_URL, HamsaChunkedStream, HamsaCredentials, HamsaRequest, HamsaSettings, HamsaTTS,
    HamsaTTSConfig,
};
