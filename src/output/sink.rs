//! Report sink trait and the static record schema
//!
//! The column list and per-field formatting are declared explicitly so the
//! row schema is a compile-time contract; there is no runtime inspection of
//! the record type.

use crate::analyze::PageStats;
use thiserror::Error;

/// Errors that can occur while rendering the report
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Report columns, in record field-declaration order.
pub const COLUMNS: [&str; 21] = [
    "Url",
    "Domain",
    "StatusCode",
    "Status",
    "Indexability",
    "ContentType",
    "Title",
    "TitleLength",
    "MetaDescription",
    "MetaDescriptionLength",
    "MetaKeywords",
    "MetaKeywordsCount",
    "Size",
    "WordCount",
    "CrawlDepth",
    "Inlinks",
    "UniqueInlinks",
    "Outlinks",
    "UniqueOutlinks",
    "ResponseTimeMillis",
    "Emails",
];

/// Formats one record as a row matching `COLUMNS`.
pub fn record_to_row(record: &PageStats) -> Vec<String> {
    vec![
        record.url.clone(),
        record.domain.clone(),
        record.status_code.to_string(),
        record.status.clone(),
        record.indexability.to_string(),
        record.content_type.clone(),
        record.title.clone(),
        record.title_length.to_string(),
        record.meta_description.clone(),
        record.meta_description_length.to_string(),
        record.meta_keywords.clone(),
        record.meta_keywords_count.to_string(),
        record.size.to_string(),
        record.word_count.to_string(),
        record.crawl_depth.to_string(),
        record.inlinks.to_string(),
        record.unique_inlinks.to_string(),
        record.outlinks.to_string(),
        record.unique_outlinks.to_string(),
        record.response_time_millis.to_string(),
        record.emails.clone(),
    ]
}

/// A consumer of per-page records
///
/// `append` is called once per record as sessions finish; `render` once,
/// after every session has been drained.
pub trait ReportSink {
    fn append(&mut self, record: &PageStats);
    fn render(&mut self) -> OutputResult<()>;
}
