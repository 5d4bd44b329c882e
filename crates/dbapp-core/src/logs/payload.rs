//! Interpretation of streamed payloads shared by the SSE and WebSocket transports.

use std::io;

use serde_json::Value;
use tracing::debug;

use crate::models::LogRecord;

use super::cursor::matches_search;
use super::sink::LogSink;

/// A payload consisting of a single NUL byte means "no logs yet".
pub const HEARTBEAT: &str = "\0";

pub const NO_LOGS_NOTICE: &str = "No logs available yet, waiting for new entries...";

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Heartbeat,
    Records(Vec<LogRecord>),
    Raw(String),
}

/// JSON objects become a record and arrays a list of records; anything
/// else is kept verbatim.
pub fn classify(payload: &str) -> Payload {
    if payload == HEARTBEAT {
        return Payload::Heartbeat;
    }
    match serde_json::from_str::<Value>(payload) {
        Ok(value @ Value::Object(_)) => match serde_json::from_value(value) {
            Ok(record) => Payload::Records(vec![record]),
            Err(e) => {
                debug!(error = %e, "Object payload is not a log record");
                Payload::Raw(payload.to_string())
            }
        },
        Ok(Value::Array(items)) => Payload::Records(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => Payload::Raw(payload.to_string()),
    }
}

/// Per-session payload state: the search filter and whether anything has arrived yet.
#[derive(Debug)]
pub struct PayloadHandler {
    search: String,
    seen_payload: bool,
}

impl PayloadHandler {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            seen_payload: false,
        }
    }

    /// A handler that shows every record, for streams the server already filtered.
    pub fn unfiltered() -> Self {
        Self::new("")
    }

    pub fn handle(&mut self, payload: &str, sink: &mut dyn LogSink) -> io::Result<()> {
        let first = !self.seen_payload;
        self.seen_payload = true;

        match classify(payload) {
            Payload::Heartbeat => {
                if first {
                    sink.notice(NO_LOGS_NOTICE)?;
                }
            }
            Payload::Records(records) => {
                for record in records.iter().filter(|r| matches_search(r, &self.search)) {
                    sink.record(record)?;
                }
            }
            Payload::Raw(line) => sink.raw(&line)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::sink::ConsoleSink;
    use crate::models::LogSource;

    #[test]
    fn test_classify_payloads() {
        assert_eq!(classify("\0"), Payload::Heartbeat);
        assert_eq!(
            classify(r#"{"timestamp":1,"source":"APP","message":"hi"}"#),
            Payload::Records(vec![LogRecord::new(Some(1), LogSource::App, "hi")])
        );
        assert_eq!(
            classify(r#"[{"message":"a"},{"message":"b"}]"#),
            Payload::Records(vec![
                LogRecord::new(None, LogSource::default(), "a"),
                LogRecord::new(None, LogSource::default(), "b"),
            ])
        );
        assert_eq!(classify("plain text"), Payload::Raw("plain text".into()));
        assert_eq!(classify("42"), Payload::Raw("42".into()));
    }

    #[test]
    fn test_first_heartbeat_prints_notice_once() {
        let mut sink = ConsoleSink::new(Vec::new());
        let mut handler = PayloadHandler::new("");
        handler.handle("\0", &mut sink).unwrap();
        handler.handle("\0", &mut sink).unwrap();
        assert_eq!(sink.displayed(), 0);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out.matches(NO_LOGS_NOTICE).count(), 1);
    }

    #[test]
    fn test_heartbeat_after_data_prints_nothing() {
        let mut sink = ConsoleSink::new(Vec::new());
        let mut handler = PayloadHandler::new("");
        handler.handle("starting", &mut sink).unwrap();
        handler.handle("\0", &mut sink).unwrap();
        assert_eq!(sink.displayed(), 1);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "starting\n");
    }

    #[test]
    fn test_search_filters_records_but_not_raw_lines() {
        let mut sink = ConsoleSink::new(Vec::new());
        let mut handler = PayloadHandler::new("error");
        handler.handle(r#"{"message":"ERROR boom","source":"APP"}"#, &mut sink).unwrap();
        handler.handle(r#"{"message":"fine","source":"APP"}"#, &mut sink).unwrap();
        handler.handle("raw line", &mut sink).unwrap();
        assert_eq!(sink.displayed(), 2);
    }

    #[test]
    fn test_unfiltered_handler_keeps_server_matched_records() {
        // The server matched "warn" against the level, not the message
        let mut sink = ConsoleSink::new(Vec::new());
        let mut handler = PayloadHandler::unfiltered();
        handler
            .handle(r#"{"message":"disk almost full","level":"WARN","source":"APP"}"#, &mut sink)
            .unwrap();
        assert_eq!(sink.displayed(), 1);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.contains("disk almost full"), "{out}");
    }
}
