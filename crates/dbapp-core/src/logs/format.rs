//! Console rendering of log records: `[HH:MM:SS] SRC   : message`.

use chrono::{DateTime, Local, TimeZone};

use crate::models::{LogRecord, LogSource};

/// Width of the source column
const SOURCE_WIDTH: usize = 6;

/// Placeholder for records without a timestamp
const NO_TIMESTAMP: &str = "        ";

/// Fixed-width source label.
pub fn source_label(source: &LogSource) -> String {
    match source {
        LogSource::System => "SYSTEM".to_string(),
        LogSource::App => "APP   ".to_string(),
        LogSource::Other(other) => {
            let truncated: String = other.chars().take(SOURCE_WIDTH).collect();
            format!("{:<width$}", truncated, width = SOURCE_WIDTH)
        }
    }
}

pub fn format_timestamp_in<Tz: TimeZone>(timestamp: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(tz).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| NO_TIMESTAMP.to_string())
}

pub fn format_record_in<Tz: TimeZone>(record: &LogRecord, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "[{}] {}: {}",
        format_timestamp_in(record.timestamp, tz),
        source_label(&record.source),
        record.message
    )
}

/// Render a record using the local time zone.
pub fn format_record(record: &LogRecord) -> String {
    format_record_in(record, &Local)
}
