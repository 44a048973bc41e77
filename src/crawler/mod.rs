//! Crawl engine for SiteGauge
//!
//! This module contains the two halves of a crawl session:
//! - `fetcher`: walks the link graph under depth/domain constraints and
//!   emits one `PageFetchEvent` per completed HTTP response
//! - `session`: the orchestrator that drives the fetcher, fans analysis
//!   tasks out concurrently, and aggregates `PageStats` behind a lock

mod fetcher;
mod session;

pub use fetcher::{build_http_client, FetchPolicy, Fetcher, PageFetchEvent};
pub use session::{CrawlSession, SessionConfig, StatsMap};
