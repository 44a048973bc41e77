//! Crawl session orchestration
//!
//! A `CrawlSession` drives one seed URL to completion: it validates the
//! seed, computes the domain allowlist, spawns the fetch engine, and hands
//! every `PageFetchEvent` to a concurrently spawned analysis task. Results
//! land in a `StatsMap` keyed by canonical URL. `run` returns only once the
//! completion barrier is crossed: traversal exhausted and every dispatched
//! analysis task joined.

use crate::analyze::{analyze_page, PageStats};
use crate::crawler::{FetchPolicy, Fetcher, PageFetchEvent};
use crate::url::{prepare_allowed_domains, trim_scheme};
use crate::SitegaugeError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

/// Buffered fetch events between the engine and the analysis dispatcher.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Per-session traversal options
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Depth ceiling for the traversal (seed = 1, 0 = unlimited)
    pub max_depth: usize,

    /// Whether discovered links are followed at all
    pub recursive: bool,

    /// Parallel vs sequential fetch dispatch within the session
    pub concurrent: bool,
}

/// Thread-safe mapping from canonical page URL to its stats
///
/// The map and its lock are one type, so every mutation path goes through
/// synchronized access. The lock is held for a single map write; that write
/// is the only point of contention between concurrent analysis tasks.
/// Last write wins when a URL is refetched.
#[derive(Debug, Default)]
pub struct StatsMap {
    inner: Mutex<HashMap<String, PageStats>>,
}

impl StatsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts one record under its URL key.
    pub fn insert(&self, stats: PageStats) {
        let mut map = self.inner.lock().unwrap();
        map.insert(stats.url.clone(), stats);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains all records as an order-independent sequence.
    pub fn drain(&self) -> Vec<PageStats> {
        let mut map = self.inner.lock().unwrap();
        map.drain().map(|(_, stats)| stats).collect()
    }
}

/// One crawl session for one seed URL
pub struct CrawlSession {
    id: u32,
    website: String,
    config: SessionConfig,
    stats: Arc<StatsMap>,
}

impl CrawlSession {
    /// Creates a session for a seed URL or bare hostname.
    ///
    /// The id is caller-supplied so session numbering stays a locally owned
    /// counter instead of process-wide state.
    pub fn new(id: u32, seed: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            id,
            website: seed.into(),
            config,
            stats: Arc::new(StatsMap::new()),
        }
    }

    /// Runs the session to completion.
    ///
    /// Returns `InvalidSeedUrl` before any fetch if the seed cannot be
    /// resolved to a host. Otherwise blocks until the fetch engine reports
    /// traversal exhausted and every dispatched analysis task has inserted
    /// its record; after that, `report` is safe to call.
    pub async fn run(&mut self) -> Result<(), SitegaugeError> {
        let allowed_domains = prepare_allowed_domains(&self.website)?;
        let start = self.start_url()?;
        tracing::debug!(session = self.id, "starting crawl of {}", start);

        let fetcher = Fetcher::new(FetchPolicy {
            max_depth: self.config.max_depth,
            recursive: self.config.recursive,
            concurrent: self.config.concurrent,
            allowed_domains,
        })?;

        let (events_tx, mut events_rx) = mpsc::channel::<PageFetchEvent>(EVENT_CHANNEL_CAPACITY);
        let fetch_task = tokio::spawn(fetcher.run(start, events_tx));

        // One analysis task per dispatched fetch event. The JoinSet is the
        // explicit accounting of in-flight work.
        let mut analyses: JoinSet<()> = JoinSet::new();
        while let Some(event) = events_rx.recv().await {
            let stats = Arc::clone(&self.stats);
            let session_id = self.id;
            analyses.spawn(async move {
                tracing::debug!(
                    session = session_id,
                    "processing page {} ({} bytes)",
                    event.url,
                    event.body.len()
                );
                match analyze_page(&event) {
                    Ok(page_stats) => stats.insert(page_stats),
                    Err(e) => tracing::warn!(session = session_id, "discarding page: {}", e),
                }
            });
        }

        // Channel closed: traversal is exhausted.
        if let Err(e) = fetch_task.await {
            tracing::warn!(session = self.id, "fetch engine task failed: {}", e);
        }

        // Completion barrier: every analysis insertion happens-before this
        // drain finishes.
        while let Some(joined) = analyses.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(session = self.id, "analysis task failed: {}", e);
            }
        }

        tracing::debug!(
            session = self.id,
            "session finished with {} records",
            self.stats.len()
        );
        Ok(())
    }

    /// Returns the accumulated records.
    ///
    /// Safe to call only after `run` has returned.
    pub fn report(&self) -> Vec<PageStats> {
        self.stats.drain()
    }

    /// Resolves the seed into the start URL, keeping an explicit scheme if
    /// the seed carried one and defaulting to `https://` otherwise.
    fn start_url(&self) -> Result<Url, SitegaugeError> {
        let with_scheme = if self.website.starts_with("http://") || self.website.starts_with("https://")
        {
            self.website.clone()
        } else {
            format!("https://{}", trim_scheme(&self.website))
        };
        Url::parse(&with_scheme).map_err(|e| SitegaugeError::InvalidSeedUrl {
            seed: self.website.clone(),
            reason: e.to_string(),
        })
    }
}
