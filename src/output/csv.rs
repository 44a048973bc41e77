//! CSV and TSV rendering
//!
//! Streams rows through a `csv::Writer`; the header row is written up
//! front and `render` flushes. TSV is the same writer with a tab delimiter.

use crate::analyze::PageStats;
use crate::output::sink::{record_to_row, OutputResult, ReportSink, COLUMNS};
use std::io::Write;

/// CSV/TSV sink writing to stdout (or any writer, for tests)
pub struct CsvSink {
    writer: csv::Writer<Box<dyn Write>>,
}

impl CsvSink {
    pub fn comma() -> Self {
        Self::with_writer(b',', Box::new(std::io::stdout()))
    }

    pub fn tab() -> Self {
        Self::with_writer(b'\t', Box::new(std::io::stdout()))
    }

    pub fn with_writer(delimiter: u8, out: Box<dyn Write>) -> Self {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(out);
        // Header first; a write failure here surfaces on the next flush.
        let _ = writer.write_record(COLUMNS);
        Self { writer }
    }
}

impl ReportSink for CsvSink {
    fn append(&mut self, record: &PageStats) {
        if let Err(e) = self.writer.write_record(record_to_row(record)) {
            tracing::error!("failed to write report row for {}: {}", record.url, e);
        }
    }

    fn render(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
