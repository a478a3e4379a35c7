//! Hamsa synthesis session.
//!
//! One session sends one POST and relays the streamed response body. The
//! session moves through `Created → RequestSent → Streaming → Completed`, or
//! fails with a `Status`, `Timeout` or `Connection` error. Nothing is retried.

use std::sync::Arc;

use async_stream::try_stream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use futures_util::{StreamExt, pin_mut};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use super::config::{
    HAMSA_CHUNK_SIZE, HAMSA_MIME_TYPE, HAMSA_NUM_CHANNELS, HamsaCredentials, HamsaRequest,
    HamsaSettings,
};
use crate::core::tts::base::{
    AudioEmitter, ChunkedStream, ConnectOptions, SynthesizedAudio, TTSError, TTSResult,
};
use crate::core::tts::registry::SessionGuard;
use crate::utils::req_manager::HttpSessionManager;

/// Request-scoped copy of the synthesizer options
#[derive(Debug, Clone)]
pub(crate) struct SessionOptions {
    pub credentials: HamsaCredentials,
    pub settings: HamsaSettings,
    pub endpoint: Url,
    pub sample_rate: u32,
}

/// A single Hamsa synthesis request and its streamed response.
///
/// Created by [`HamsaTTS::synthesize`](super::HamsaTTS). Consumed by
/// [`ChunkedStream::run`] (push into an [`AudioEmitter`]) or
/// [`HamsaChunkedStream::into_stream`] (pull [`SynthesizedAudio`] events).
/// Dropping the session, or the future/stream driving it, releases the
/// response.
pub struct HamsaChunkedStream {
    input_text: String,
    opts: SessionOptions,
    conn_options: ConnectOptions,
    connections: Arc<HttpSessionManager>,
    request_id: String,
    cancel_token: CancellationToken,
    _guard: SessionGuard,
}

impl HamsaChunkedStream {
    pub(crate) fn new(
        input_text: String,
        opts: SessionOptions,
        conn_options: ConnectOptions,
        connections: Arc<HttpSessionManager>,
        request_id: String,
        cancel_token: CancellationToken,
        guard: SessionGuard,
    ) -> Self {
        Self {
            input_text,
            opts,
            conn_options,
            connections,
            request_id,
            cancel_token,
            _guard: guard,
        }
    }

    /// Token that aborts this session when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Pull-based view of the session.
    ///
    /// Yields `Started` before the request is sent, then one `Chunk` per piece
    /// of the body (at most 4096 bytes each, in receipt order), then
    /// `Finished`. An error ends the stream; `Finished` is only yielded after
    /// the body was fully relayed.
    pub fn into_stream(self) -> impl Stream<Item = TTSResult<SynthesizedAudio>> + Send {
        try_stream! {
            if self.cancel_token.is_cancelled() {
                Err::<(), _>(TTSError::Cancelled)?;
            }

            let body = self.opts.settings.as_request_json(&self.input_text);

            yield SynthesizedAudio::Started {
                request_id: self.request_id.clone(),
                sample_rate: self.opts.sample_rate,
                num_channels: HAMSA_NUM_CHANNELS,
                mime_type: HAMSA_MIME_TYPE,
            };

            let tracker = self.connections.metrics().track();
            let response = self.send_request(&body).await?;

            debug!(request_id = %self.request_id, "Hamsa TTS streaming response body");
            let chunks = response.bytes_stream();
            pin_mut!(chunks);

            let mut total_bytes = 0usize;
            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.cancel_token.cancelled() => Err(TTSError::Cancelled),
                    next = chunks.next() => Ok(next),
                };

                let Some(item) = next? else { break };
                let bytes = item.map_err(TTSError::from)?;
                total_bytes += bytes.len();

                for chunk in ChunkSplitter::new(bytes, HAMSA_CHUNK_SIZE) {
                    yield SynthesizedAudio::Chunk(chunk);
                }
            }

            tracker.complete();
            info!(
                request_id = %self.request_id,
                bytes = total_bytes,
                "Hamsa TTS synthesis complete"
            );
            yield SynthesizedAudio::Finished;
        }
    }

    /// Send the request and wait for the response headers.
    ///
    /// `conn_options.timeout` bounds connection establishment only; time to
    /// first byte and the body read are not limited.
    async fn send_request(&self, body: &HamsaRequest<'_>) -> TTSResult<reqwest::Response> {
        let client = self.connections.ensure_session(self.conn_options.timeout)?;
        let request = build_request(&client, &self.opts, body);

        debug!(
            request_id = %self.request_id,
            speaker = %self.opts.settings.speaker(),
            text_len = self.input_text.len(),
            "Sending Hamsa TTS request"
        );

        let response = tokio::select! {
            biased;
            _ = self.cancel_token.cancelled() => return Err(TTSError::Cancelled),
            result = request.send() => match result {
                Ok(response) => response,
                Err(e) => {
                    let err = TTSError::from(e);
                    if matches!(err, TTSError::Timeout(_)) {
                        warn!(
                            request_id = %self.request_id,
                            connect_timeout_ms = self.conn_options.timeout.as_millis() as u64,
                            "Hamsa TTS connection timed out"
                        );
                    }
                    return Err(err);
                }
            },
        };

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            warn!(
                request_id = %self.request_id,
                status = status.as_u16(),
                "Hamsa TTS API error: {}",
                body
            );
            return Err(TTSError::Status {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChunkedStream for HamsaChunkedStream {
    fn input_text(&self) -> &str {
        &self.input_text
    }

    fn request_id(&self) -> &str {
        &self.request_id
    }

    async fn run(self, emitter: &mut dyn AudioEmitter) -> TTSResult<()> {
        let request_id = self.request_id.clone();
        let events = self.into_stream();
        pin_mut!(events);

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    warn!(request_id = %request_id, error = %e, "Hamsa TTS session failed");
                    return Err(e);
                }
            };

            match event {
                SynthesizedAudio::Started {
                    request_id,
                    sample_rate,
                    num_channels,
                    mime_type,
                } => emitter.initialize(&request_id, sample_rate, num_channels, mime_type),
                SynthesizedAudio::Chunk(data) => emitter.push(data),
                SynthesizedAudio::Finished => emitter.flush(),
            }
        }

        Ok(())
    }
}

/// Build the POST request for `body`
pub(crate) fn build_request(
    client: &reqwest::Client,
    opts: &SessionOptions,
    body: &HamsaRequest<'_>,
) -> reqwest::RequestBuilder {
    client
        .post(opts.endpoint.clone())
        .header(AUTHORIZATION, opts.credentials.authorization())
        .header(CONTENT_TYPE, "application/json")
        .json(body)
}

/// Splits a transport chunk into pieces of at most `max_len` bytes without copying
pub(crate) struct ChunkSplitter {
    remaining: Bytes,
    max_len: usize,
}

impl ChunkSplitter {
    pub(crate) fn new(bytes: Bytes, max_len: usize) -> Self {
        Self {
            remaining: bytes,
            max_len: max_len.max(1),
        }
    }
}

impl Iterator for ChunkSplitter {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.remaining.is_empty() {
            return None;
        }
        let take = self.max_len.min(self.remaining.len());
        Some(self.remaining.split_to(take))
    }
}
