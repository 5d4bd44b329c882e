//! Search filtering and the monotonic display cursor.

use crate::models::LogRecord;

/// Case-insensitive substring match on the message. An empty search matches everything.
pub fn matches_search(record: &LogRecord, search: &str) -> bool {
    search.is_empty() || record.message.to_lowercase().contains(&search.to_lowercase())
}

pub fn filter_records(records: Vec<LogRecord>, search: &str) -> Vec<LogRecord> {
    if search.is_empty() {
        return records;
    }
    let needle = search.to_lowercase();
    records
        .into_iter()
        .filter(|r| r.message.to_lowercase().contains(&needle))
        .collect()
}

/// Tracks the newest timestamp already displayed so a polling session never
/// shows a record twice.
#[derive(Debug, Clone, Default)]
pub struct LogCursor {
    last: Option<i64>,
}

impl LogCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }

    /// Sort a batch by timestamp and keep only records newer than the cursor,
    /// then move the cursor to the newest record kept.
    pub fn advance(&mut self, mut records: Vec<LogRecord>) -> Vec<LogRecord> {
        records.sort_by_key(LogRecord::sort_key);
        let fresh: Vec<LogRecord> = match self.last {
            Some(last) => records.into_iter().filter(|r| r.sort_key() > last).collect(),
            None => records,
        };
        if let Some(newest) = fresh.iter().map(LogRecord::sort_key).max() {
            self.last = Some(self.last.map_or(newest, |last| last.max(newest)));
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogSource;

    fn rec(ts: i64, msg: &str) -> LogRecord {
        LogRecord::new(Some(ts), LogSource::App, msg)
    }

    fn messages(records: &[LogRecord]) -> Vec<&str> {
        records.iter().map(|r| r.message.as_str()).collect()
    }

    #[test]
    fn test_advance_sorts_and_skips_seen() {
        let mut cursor = LogCursor::new();
        cursor.advance(vec![rec(1, "a")]);
        let out = cursor.advance(vec![rec(1, "a"), rec(3, "b"), rec(2, "c")]);
        assert_eq!(messages(&out), vec!["c", "b"]);
        assert_eq!(cursor.last(), Some(3));
    }

    #[test]
    fn test_first_batch_emits_everything() {
        let mut cursor = LogCursor::new();
        let out = cursor.advance(vec![rec(5, "x"), rec(4, "y")]);
        assert_eq!(messages(&out), vec!["y", "x"]);
        assert_eq!(cursor.last(), Some(5));
    }

    #[test]
    fn test_cursor_is_monotonic_across_ticks() {
        let mut cursor = LogCursor::new();
        let ticks = vec![
            vec![rec(1, "a"), rec(2, "b")],
            vec![rec(1, "a"), rec(2, "b"), rec(3, "c")],
            vec![rec(2, "b"), rec(3, "c")],
            vec![rec(3, "c"), rec(4, "d"), rec(2, "late")],
        ];
        let mut max_seen = i64::MIN;
        let mut emitted = Vec::new();
        for tick in ticks {
            let out = cursor.advance(tick);
            for r in &out {
                assert!(r.sort_key() > max_seen, "{} re-emitted", r.message);
            }
            if let Some(m) = out.iter().map(LogRecord::sort_key).max() {
                max_seen = max_seen.max(m);
            }
            emitted.extend(out);
        }
        assert_eq!(messages(&emitted), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_records_without_timestamp_are_not_repeated() {
        let mut cursor = LogCursor::new();
        let first = cursor.advance(vec![LogRecord::new(None, LogSource::System, "boot")]);
        assert_eq!(first.len(), 1);
        let second = cursor.advance(vec![LogRecord::new(None, LogSource::System, "boot")]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_empty_batch_keeps_cursor() {
        let mut cursor = LogCursor::new();
        cursor.advance(vec![rec(7, "x")]);
        assert!(cursor.advance(Vec::new()).is_empty());
        assert_eq!(cursor.last(), Some(7));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![
            LogRecord::new(None, LogSource::App, "Error: x"),
            LogRecord::new(None, LogSource::App, "ok"),
        ];
        let out = filter_records(records.clone(), "error");
        assert_eq!(messages(&out), vec!["Error: x"]);
        assert!(matches_search(&records[1], ""));
        assert_eq!(filter_records(records, "").len(), 2);
    }
}
