//! ASCII table rendering
//!
//! Buffers rows until `render`, then prints a bordered table with column
//! widths sized to the widest cell. Long cells are truncated so one noisy
//! page cannot blow up the terminal layout.

use crate::analyze::PageStats;
use crate::output::sink::{record_to_row, OutputResult, ReportSink, COLUMNS};
use std::io::Write;

/// Cells longer than this are truncated with an ellipsis.
const MAX_CELL_WIDTH: usize = 40;

/// Table sink buffering rows for a width-computed render
pub struct TableSink {
    rows: Vec<Vec<String>>,
    out: Box<dyn Write>,
}

impl TableSink {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write>) -> Self {
        Self {
            rows: Vec::new(),
            out,
        }
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }

    fn write_separator(&mut self, widths: &[usize]) -> std::io::Result<()> {
        for width in widths {
            write!(self.out, "+{}", "-".repeat(width + 2))?;
        }
        writeln!(self.out, "+")
    }

    fn write_row(&mut self, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
        for (cell, width) in cells.iter().zip(widths) {
            write!(self.out, "| {:<w$} ", cell, w = *width)?;
        }
        writeln!(self.out, "|")
    }
}

impl Default for TableSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for TableSink {
    fn append(&mut self, record: &PageStats) {
        let row = record_to_row(record)
            .into_iter()
            .map(|cell| truncate_cell(cell, MAX_CELL_WIDTH))
            .collect();
        self.rows.push(row);
    }

    fn render(&mut self) -> OutputResult<()> {
        let widths = self.column_widths();
        let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();

        self.write_separator(&widths)?;
        self.write_row(&header, &widths)?;
        self.write_separator(&widths)?;
        let rows = std::mem::take(&mut self.rows);
        for row in &rows {
            self.write_row(row, &widths)?;
        }
        self.write_separator(&widths)?;
        self.out.flush()?;
        Ok(())
    }
}

fn truncate_cell(cell: String, max: usize) -> String {
    if cell.chars().count() <= max {
        return cell;
    }
    let mut truncated: String = cell.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::Indexability;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn record(url: &str) -> PageStats {
        PageStats {
            url: url.to_string(),
            domain: "example.com".to_string(),
            status_code: 200,
            status: "OK".to_string(),
            indexability: Indexability::Indexable,
            content_type: "text/html".to_string(),
            title: "Hi".to_string(),
            title_length: 2,
            meta_description: String::new(),
            meta_description_length: 0,
            meta_keywords: String::new(),
            meta_keywords_count: 0,
            size: 64,
            word_count: 5,
            crawl_depth: 1,
            inlinks: 0,
            unique_inlinks: 0,
            outlinks: 0,
            unique_outlinks: 0,
            response_time_millis: 10,
            emails: String::new(),
        }
    }

    #[test]
    fn test_table_contains_header_and_rows() {
        let buf = SharedBuf::default();
        let mut sink = TableSink::with_writer(Box::new(buf.clone()));
        sink.append(&record("https://example.com/a"));
        sink.append(&record("https://example.com/b"));
        sink.render().unwrap();

        let rendered = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(rendered.contains("Url"));
        assert!(rendered.contains("Indexability"));
        assert!(rendered.contains("https://example.com/a"));
        assert!(rendered.contains("https://example.com/b"));
        // Header, 2 rows, 3 separators.
        assert_eq!(rendered.lines().count(), 6);
    }

    #[test]
    fn test_long_cells_truncated() {
        let long_url = format!("https://example.com/{}", "x".repeat(100));
        let buf = SharedBuf::default();
        let mut sink = TableSink::with_writer(Box::new(buf.clone()));
        sink.append(&record(&long_url));
        sink.render().unwrap();

        let rendered = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(!rendered.contains(&long_url));
        assert!(rendered.contains('…'));
    }
}
