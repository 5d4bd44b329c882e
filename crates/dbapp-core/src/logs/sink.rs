use std::io::{self, Write};

use crate::models::LogRecord;

use super::format::format_record;

/// Destination for session output.
pub trait LogSink: Send {
    /// Display one record. Counts towards the session total.
    fn record(&mut self, record: &LogRecord) -> io::Result<()>;

    /// Display a line that could not be parsed as a record. Counts towards the total.
    fn raw(&mut self, line: &str) -> io::Result<()>;

    /// Informational line; not counted.
    fn notice(&mut self, text: &str) -> io::Result<()>;

    fn displayed(&self) -> usize;
}

/// Writes formatted lines to any writer, usually stdout.
#[derive(Debug)]
pub struct ConsoleSink<W: Write + Send> {
    out: W,
    displayed: usize,
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, displayed: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush()
    }
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LogSink for ConsoleSink<W> {
    fn record(&mut self, record: &LogRecord) -> io::Result<()> {
        self.line(&format_record(record))?;
        self.displayed += 1;
        Ok(())
    }

    fn raw(&mut self, line: &str) -> io::Result<()> {
        self.line(line)?;
        self.displayed += 1;
        Ok(())
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        self.line(text)
    }

    fn displayed(&self) -> usize {
        self.displayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogSource;

    #[test]
    fn test_console_sink_counts_records_and_raw_lines() {
        let mut sink = ConsoleSink::new(Vec::new());
        sink.notice("waiting").unwrap();
        sink.record(&LogRecord::new(None, LogSource::App, "hello")).unwrap();
        sink.raw("not json").unwrap();
        assert_eq!(sink.displayed(), 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "waiting\n[        ] APP   : hello\nnot json\n");
    }
}
