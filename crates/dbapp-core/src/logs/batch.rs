use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use crate::api::{ApiClient, ResponseBody};
use crate::models::LogRecord;

use super::cursor::{filter_records, LogCursor};
use super::sink::LogSink;
use super::transport::{LogTransport, SessionEnd, StreamBudget, StreamOptions};

pub const BATCH_PATH: &str = "/logz/batch";

/// Polls `/logz/batch` and prints records newer than the last one shown.
#[derive(Debug, Clone)]
pub struct BatchTransport {
    client: ApiClient,
}

impl BatchTransport {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the current batch, keeping only records that match `search`.
    pub async fn fetch(&self, search: &str) -> Result<Vec<LogRecord>> {
        let records = match self.client.get(BATCH_PATH).await? {
            ResponseBody::Json(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<LogRecord>(item) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        debug!(error = %e, "Skipping malformed log entry");
                        None
                    }
                })
                .collect(),
            other => {
                debug!(?other, "Batch endpoint did not return a list");
                Vec::new()
            }
        };
        Ok(filter_records(records, search))
    }
}

#[async_trait]
impl LogTransport for BatchTransport {
    fn endpoint(&self) -> String {
        self.client.url(BATCH_PATH)
    }

    async fn stream(&mut self, options: &StreamOptions, sink: &mut dyn LogSink) -> Result<SessionEnd> {
        let started = Instant::now();
        let mut cursor = LogCursor::new();

        loop {
            if let StreamBudget::For(duration) = options.budget {
                if started.elapsed() > duration {
                    return Ok(SessionEnd::TimedOut);
                }
            }

            let records = self.fetch(&options.search).await?;
            let fresh = cursor.advance(records);
            debug!(new = fresh.len(), cursor = ?cursor.last(), "Polled batch endpoint");
            for record in &fresh {
                sink.record(record)?;
            }

            if options.budget == StreamBudget::Once {
                return Ok(SessionEnd::Completed);
            }
            tokio::time::sleep(options.interval).await;
        }
    }
}
