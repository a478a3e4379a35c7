use bytes::Bytes;
use hamsa_tts::AudioEmitter;

/// Emitter that records every callback
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub initialized: Vec<(String, u32, u16, String)>,
    pub chunks: Vec<Bytes>,
    pub flushes: usize,
    pub pushes_after_flush: usize,
}

impl RecordingEmitter {
    pub fn audio(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn max_chunk_len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).max().unwrap_or(0)
    }
}

impl AudioEmitter for RecordingEmitter {
    fn initialize(&mut self, request_id: &str, sample_rate: u32, num_channels: u16, mime_type: &str) {
        self.initialized.push((
            request_id.to_string(),
            sample_rate,
            num_channels,
            mime_type.to_string(),
        ));
    }

    fn push(&mut self, data: Bytes) {
        if self.flushes > 0 {
            self.pushes_after_flush += 1;
        }
        self.chunks.push(data);
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
