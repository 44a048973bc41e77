//! Fetch engine: link-graph traversal and page delivery
//!
//! The fetcher walks a site breadth-first from a start URL, bounded by a
//! maximum depth and a domain allowlist. Every completed HTTP response
//! (whatever its status code) is delivered as a `PageFetchEvent` over an
//! mpsc channel; dropping the sender is the traversal-complete signal the
//! session's completion barrier keys on.

use reqwest::header::HeaderMap;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Traversal policy for one crawl session
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Depth ceiling; the seed is depth 1, 0 means unlimited
    pub max_depth: usize,

    /// Whether discovered links are followed at all
    pub recursive: bool,

    /// Parallel vs sequential fetch dispatch within a depth level
    pub concurrent: bool,

    /// Origins the traversal is permitted to follow into
    pub allowed_domains: Vec<String>,
}

/// One completed page fetch
///
/// Owned transiently by the analysis task that consumes it; not retained
/// after `PageStats` is derived.
#[derive(Debug)]
pub struct PageFetchEvent {
    /// The resolved URL that was fetched
    pub url: String,

    /// HTTP status code of the response
    pub status_code: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Raw body bytes
    pub body: Vec<u8>,

    /// Traversal depth at which the page was fetched (seed = 1)
    pub depth: usize,

    /// Fetch latency
    pub elapsed: Duration,
}

/// Builds the HTTP client used for all fetches in a session.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Breadth-first fetch engine for one session
pub struct Fetcher {
    client: Client,
    policy: FetchPolicy,
    visited: HashSet<String>,
}

impl Fetcher {
    pub fn new(policy: FetchPolicy) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client()?,
            policy,
            visited: HashSet::new(),
        })
    }

    /// Runs the traversal to exhaustion, sending one event per fetched page.
    ///
    /// The channel sender is dropped on return, which closes the receiver
    /// and signals the session that no more pages are coming. Fetch errors
    /// are logged and skipped; one bad link never aborts the traversal.
    pub async fn run(mut self, start: Url, events: mpsc::Sender<PageFetchEvent>) {
        let mut frontier = vec![start];
        let mut depth = 1usize;

        while !frontier.is_empty() {
            if self.policy.max_depth != 0 && depth > self.policy.max_depth {
                break;
            }

            let level: Vec<Url> = frontier
                .drain(..)
                .filter(|url| self.admit(url))
                .collect();

            let mut next_frontier = Vec::new();
            if self.policy.concurrent {
                let mut fetches = JoinSet::new();
                for url in level {
                    let client = self.client.clone();
                    let recursive = self.policy.recursive;
                    fetches.spawn(async move { fetch_one(&client, url, depth, recursive).await });
                }
                while let Some(joined) = fetches.join_next().await {
                    match joined {
                        Ok(Some((event, links))) => {
                            next_frontier.extend(links);
                            if events.send(event).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!("fetch task panicked: {}", e),
                    }
                }
            } else {
                for url in level {
                    if let Some((event, links)) =
                        fetch_one(&self.client, url, depth, self.policy.recursive).await
                    {
                        next_frontier.extend(links);
                        if events.send(event).await.is_err() {
                            return;
                        }
                    }
                }
            }

            frontier = next_frontier;
            depth += 1;
        }
    }

    /// Decides whether a URL may be visited, recording it as visited if so.
    ///
    /// Already-visited URLs are an expected condition and skipped without
    /// logging; out-of-allowlist hosts are skipped silently too.
    fn admit(&mut self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let allowed = self
            .policy
            .allowed_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(host));
        if !allowed {
            tracing::trace!("skipping {}: host outside allowlist", url);
            return false;
        }
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }
        tracing::debug!("visiting: {}", url);
        true
    }
}

/// Fetches one URL and discovers its outgoing links.
///
/// Returns `None` on a transport-level failure (logged, traversal
/// continues). Responses with error status codes still produce events.
async fn fetch_one(
    client: &Client,
    url: Url,
    depth: usize,
    recursive: bool,
) -> Option<(PageFetchEvent, Vec<Url>)> {
    let started = Instant::now();
    let response = match client.get(url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("error while visiting {}: {}", url, e);
            return None;
        }
    };

    let final_url = response.url().clone();
    let status_code = response.status().as_u16();
    let headers = response.headers().clone();
    let body = match response.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            tracing::warn!("error reading body of {}: {}", url, e);
            return None;
        }
    };
    let elapsed = started.elapsed();

    let links = if recursive {
        discover_links(&body, &final_url)
    } else {
        Vec::new()
    };

    let event = PageFetchEvent {
        url: final_url.to_string(),
        status_code,
        headers,
        body,
        depth,
        elapsed,
    };
    Some((event, links))
}

/// Extracts `a[href]` targets resolved against the response URL.
///
/// Fragments are stripped so anchor variants of a page collapse into one
/// visit. Hrefs that fail to resolve are dropped.
fn discover_links(body: &[u8], base: &Url) -> Vec<Url> {
    let text = String::from_utf8_lossy(body);
    let document = Html::parse_document(&text);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        match base.join(href.trim()) {
            Ok(mut resolved) => {
                if resolved.scheme() == "http" || resolved.scheme() == "https" {
                    resolved.set_fragment(None);
                    links.push(resolved);
                }
            }
            Err(e) => {
                tracing::debug!("error while linking {}: {}", href, e);
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(allowed: &[&str]) -> FetchPolicy {
        FetchPolicy {
            max_depth: 1,
            recursive: false,
            concurrent: true,
            allowed_domains: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[test]
    fn test_admit_respects_allowlist() {
        let mut fetcher = Fetcher::new(policy(&["example.com", "www.example.com"])).unwrap();
        assert!(fetcher.admit(&Url::parse("https://example.com/a").unwrap()));
        assert!(fetcher.admit(&Url::parse("https://www.example.com/a").unwrap()));
        assert!(!fetcher.admit(&Url::parse("https://other.com/a").unwrap()));
        assert!(!fetcher.admit(&Url::parse("https://sub.example.com/a").unwrap()));
    }

    #[test]
    fn test_admit_skips_already_visited() {
        let mut fetcher = Fetcher::new(policy(&["example.com"])).unwrap();
        let url = Url::parse("https://example.com/a").unwrap();
        assert!(fetcher.admit(&url));
        assert!(!fetcher.admit(&url));
    }

    #[test]
    fn test_discover_links_resolves_relative() {
        let base = Url::parse("https://example.com/dir/page").unwrap();
        let links = discover_links(b"<a href=\"/about\">x</a><a href=\"sibling\">y</a>", &base);
        let strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            strings,
            vec!["https://example.com/about", "https://example.com/dir/sibling"]
        );
    }

    #[test]
    fn test_discover_links_strips_fragments_and_schemes() {
        let base = Url::parse("https://example.com/").unwrap();
        let links = discover_links(
            b"<a href=\"/a#top\">x</a><a href=\"mailto:a@b.co\">m</a><a href=\"javascript:void(0)\">j</a>",
            &base,
        );
        let strings: Vec<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(strings, vec!["https://example.com/a"]);
    }
}
