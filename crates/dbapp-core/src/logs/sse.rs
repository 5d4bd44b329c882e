use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::error::Error;

use super::payload::PayloadHandler;
use super::sink::LogSink;
use super::transport::{LogTransport, SessionEnd, StreamOptions};

pub const STREAM_PATH: &str = "/logz/stream";

const EVENT_STREAM: &str = "text/event-stream";

/// Longest line kept while waiting for its newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Splits an event stream into `data:` payloads. Bytes may arrive in
/// arbitrary chunks, so partial lines are buffered up to `MAX_LINE_BYTES`.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    // Set after an oversized line was dropped, until its newline arrives
    discarding: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every complete `data:` payload it finished.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.strip_prefix(' ').unwrap_or(data).to_string());
            }
        }
        if self.buffer.len() > MAX_LINE_BYTES {
            warn!(bytes = self.buffer.len(), "Dropping oversized event stream line");
            self.buffer.clear();
            self.discarding = true;
        }
        payloads
    }
}

/// Reads the app's Server-Sent Events log stream.
#[derive(Debug, Clone)]
pub struct SseTransport {
    client: ApiClient,
}

impl SseTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LogTransport for SseTransport {
    fn endpoint(&self) -> String {
        self.client.url(STREAM_PATH)
    }

    async fn stream(&mut self, options: &StreamOptions, sink: &mut dyn LogSink) -> Result<SessionEnd> {
        let response = self.client.open_stream(STREAM_PATH, EVENT_STREAM).await?;
        debug!(status = %response.status(), "Event stream opened");

        let deadline = options.budget.deadline(Instant::now());
        let mut body = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut handler = PayloadHandler::new(options.search.clone());

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, body.next()).await {
                    Ok(next) => next,
                    Err(_) => return Ok(SessionEnd::TimedOut),
                },
                None => body.next().await,
            };

            let Some(chunk) = next else {
                debug!("Server closed the event stream");
                return Ok(SessionEnd::Completed);
            };
            let chunk = chunk.map_err(|e| Error::Transport(format!("Event stream failed: {}", e)))?;

            for payload in decoder.feed(&chunk) {
                handler.handle(&payload, sink)?;
            }
        }
    }
}
