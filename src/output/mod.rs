//! Report rendering for SiteGauge
//!
//! The report sink consumes `PageStats` records one at a time and renders
//! them once every session has finished. Three renderings are supported:
//! an ASCII table for terminals, and CSV/TSV for machine consumption.

mod csv;
mod sink;
mod table;

pub use self::csv::CsvSink;
pub use sink::{record_to_row, OutputError, OutputResult, ReportSink, COLUMNS};
pub use table::TableSink;

use clap::ValueEnum;

/// Output rendering selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Tsv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        })
    }
}

impl OutputFormat {
    /// Builds the sink for this format, writing to stdout.
    pub fn make_sink(self) -> Box<dyn ReportSink> {
        match self {
            Self::Table => Box::new(TableSink::new()),
            Self::Csv => Box::new(CsvSink::comma()),
            Self::Tsv => Box::new(CsvSink::tab()),
        }
    }
}
