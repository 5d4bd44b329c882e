use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::time::Instant;

use crate::api::ApiClient;

use super::batch::BatchTransport;
use super::sink::LogSink;
use super::sse::SseTransport;
use super::websocket::WebSocketTransport;

/// How long a session keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamBudget {
    /// One fetch for polling; until the server closes for streams.
    Once,
    For(Duration),
    Forever,
}

impl StreamBudget {
    /// `n > 0` runs for `n` seconds, `n < 0` forever, `0` once.
    pub fn from_duration_secs(secs: i64) -> Self {
        match secs {
            0 => StreamBudget::Once,
            s if s < 0 => StreamBudget::Forever,
            s => StreamBudget::For(Duration::from_secs(s.unsigned_abs())),
        }
    }

    pub fn deadline(&self, start: Instant) -> Option<Instant> {
        match self {
            StreamBudget::For(duration) => Some(start + *duration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamOptions {
    pub search: String,
    pub budget: StreamBudget,
    /// Delay between polls; only the batch transport uses it.
    pub interval: Duration,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            search: String::new(),
            budget: StreamBudget::Once,
            interval: Duration::from_secs(5),
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    Interrupted,
    TimedOut,
}

/// A way of retrieving an app's log stream.
#[async_trait]
pub trait LogTransport: Send {
    /// Endpoint shown to the user before the session starts.
    fn endpoint(&self) -> String;

    /// Read logs into `sink` until the budget is spent or the source ends.
    async fn stream(&mut self, options: &StreamOptions, sink: &mut dyn LogSink) -> Result<SessionEnd>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Batch,
    Sse,
    WebSocket,
}

impl TransportKind {
    pub fn build(self, client: ApiClient) -> Box<dyn LogTransport> {
        match self {
            TransportKind::Batch => Box::new(BatchTransport::new(client)),
            TransportKind::Sse => Box::new(SseTransport::new(client)),
            TransportKind::WebSocket => Box::new(WebSocketTransport::new(client)),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Batch => write!(f, "batch"),
            TransportKind::Sse => write!(f, "sse"),
            TransportKind::WebSocket => write!(f, "websocket"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" | "poll" => Ok(TransportKind::Batch),
            "sse" => Ok(TransportKind::Sse),
            "ws" | "websocket" => Ok(TransportKind::WebSocket),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}
