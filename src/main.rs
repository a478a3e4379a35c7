use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use bytes::Bytes;
use clap::Parser;
use tracing::{info, warn};

use hamsa_tts::{AudioEmitter, BaseTTS, ChunkedStream, ClientConfig, HamsaTTS};

/// Hamsa TTS - synthesize speech to a file
#[derive(Parser, Debug)]
#[command(name = "hamsa-tts")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Text to synthesize
    #[arg(short = 't', long = "text")]
    text: String,

    /// Output file (WAV for PCM, raw bytes for mu-law)
    #[arg(short = 'o', long = "output", default_value = "output.wav")]
    output: PathBuf,

    #[arg(long = "speaker")]
    speaker: Option<String>,

    #[arg(long = "dialect")]
    dialect: Option<String>,

    /// Request 8-bit mu-law instead of 16-bit PCM
    #[arg(long = "mulaw")]
    mulaw: bool,

    /// Connect timeout in seconds
    #[arg(long = "timeout-secs")]
    timeout_secs: Option<u64>,
}

enum Sink {
    Wav(hound::WavWriter<BufWriter<File>>),
    Raw(BufWriter<File>),
}

/// Writes relayed audio to disk
struct FileEmitter {
    path: PathBuf,
    mulaw: bool,
    sink: Option<Sink>,
    // Odd trailing byte of a 16-bit sample split across chunks
    carry: Option<u8>,
    bytes_written: usize,
    error: Option<anyhow::Error>,
}

impl FileEmitter {
    fn new(path: PathBuf, mulaw: bool) -> Self {
        Self {
            path,
            mulaw,
            sink: None,
            carry: None,
            bytes_written: 0,
            error: None,
        }
    }

    fn record<E>(&mut self, result: Result<(), E>)
    where
        E: Into<anyhow::Error>,
    {
        if let Err(e) = result
            && self.error.is_none()
        {
            self.error = Some(e.into());
        }
    }

    fn open(&self, sample_rate: u32, num_channels: u16) -> anyhow::Result<Sink> {
        if self.mulaw {
            let file = File::create(&self.path)
                .with_context(|| format!("Failed to create {}", self.path.display()))?;
            return Ok(Sink::Raw(BufWriter::new(file)));
        }

        let wav_spec = hound::WavSpec {
            channels: num_channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(&self.path, wav_spec)
            .with_context(|| format!("Failed to create {}", self.path.display()))?;
        Ok(Sink::Wav(writer))
    }

    fn write(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(anyhow!("audio received before initialization"));
        };

        match sink {
            Sink::Raw(file) => file.write_all(data)?,
            Sink::Wav(writer) => {
                let mut bytes = data;
                if let Some(low) = self.carry.take()
                    && let Some((&high, rest)) = bytes.split_first()
                {
                    writer.write_sample(i16::from_le_bytes([low, high]))?;
                    bytes = rest;
                }
                let mut samples = bytes.chunks_exact(2);
                for pair in &mut samples {
                    writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
                }
                self.carry = samples.remainder().first().copied();
            }
        }

        self.bytes_written += data.len();
        Ok(())
    }

    /// Close the output file and report the first write error, if any
    fn finish(mut self) -> anyhow::Result<usize> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        match self.sink.take() {
            Some(Sink::Wav(writer)) => writer.finalize()?,
            Some(Sink::Raw(mut file)) => file.flush()?,
            None => {}
        }

        if self.carry.is_some() {
            warn!("Discarding trailing odd byte of PCM audio");
        }
        Ok(self.bytes_written)
    }
}

impl AudioEmitter for FileEmitter {
    fn initialize(&mut self, request_id: &str, sample_rate: u32, num_channels: u16, mime_type: &str) {
        info!(
            request_id = %request_id,
            sample_rate,
            num_channels,
            mime_type = %mime_type,
            output = %self.path.display(),
            "Writing audio"
        );
        match self.open(sample_rate, num_channels) {
            Ok(sink) => self.sink = Some(sink),
            Err(e) => self.record(Err(e)),
        }
    }

    fn push(&mut self, data: Bytes) {
        if self.error.is_some() {
            return;
        }
        let result = self.write(&data);
        self.record(result);
    }

    fn flush(&mut self) {
        if let Some(Sink::Raw(file)) = self.sink.as_mut() {
            let result = file.flush();
            self.record(result);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Load configuration from file or environment
    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading configuration from {}", config_path.display());
        ClientConfig::from_file(config_path)?
    } else {
        ClientConfig::from_env()?
    };

    if let Some(speaker) = cli.speaker {
        config.speaker = speaker;
    }
    if let Some(dialect) = cli.dialect {
        config.dialect = Some(dialect);
    }
    if cli.mulaw {
        config.mulaw = true;
    }
    if let Some(timeout_secs) = cli.timeout_secs {
        config.timeout_seconds = timeout_secs;
    }
    config.validate()?;

    let tts = HamsaTTS::new(config.to_tts_config()).context("Failed to create Hamsa TTS")?;
    let session = tts.synthesize(&cli.text, config.connect_options())?;

    let mut emitter = FileEmitter::new(cli.output.clone(), config.mulaw);
    let result = session.run(&mut emitter).await;
    tts.close().await;

    result.context("Synthesis failed")?;
    let bytes = emitter.finish().context("Failed to write audio")?;

    info!(
        bytes,
        output = %cli.output.display(),
        "Synthesis complete"
    );
    Ok(())
}
