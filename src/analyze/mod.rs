//! Per-page analysis for SiteGauge
//!
//! This module turns a fetched page into its SEO metrics:
//! - Indexability classification from status, robots signals and canonicals
//! - Link inventory (internal vs external, total vs unique)
//! - Text metrics (word count, title and meta lengths)
//! - Meta keyword/description extraction
//! - Contact email extraction from the raw body

mod emails;
mod page;

pub use emails::extract_emails;
pub use page::{analyze_page, count_words, strip_html, Indexability, PageStats};
