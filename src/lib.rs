//! SiteGauge: a per-page SEO crawl auditor
//!
//! This crate implements a concurrent crawler that walks a site's link graph
//! under depth and domain constraints, computes per-page SEO metrics
//! (indexability, link counts, word counts, meta tags, contact emails), and
//! aggregates the results into a tabular report.

pub mod analyze;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for SiteGauge operations
#[derive(Debug, Error)]
pub enum SitegaugeError {
    #[error("invalid seed URL '{seed}': {reason}")]
    InvalidSeedUrl { seed: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from analyzing a single fetched page
///
/// These are discard-and-continue failures: the caller logs them and drops
/// the page, the session keeps running.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("malformed page URL '{url}': {source}")]
    MalformedPageUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("unparsable response body for '{url}'")]
    UnparsableBody { url: String },
}

/// Result type alias for SiteGauge operations
pub type Result<T> = std::result::Result<T, SitegaugeError>;

// Re-export commonly used types
pub use analyze::{analyze_page, Indexability, PageStats};
pub use crawler::{CrawlSession, PageFetchEvent, SessionConfig};
pub use output::{OutputFormat, ReportSink};
pub use url::prepare_allowed_domains;
