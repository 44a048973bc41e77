//! Page analysis: `PageFetchEvent` to `PageStats`
//!
//! A pure transformation with no shared mutable state. Failures here mean
//! one page is discarded; they never abort the session.

use crate::analyze::extract_emails;
use crate::crawler::PageFetchEvent;
use crate::AnalyzeError;
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

const NOINDEX: &str = "noindex";

/// Search-engine indexability classification for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexability {
    Indexable,
    NonIndexable,
}

impl Indexability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexable => "Indexable",
            Self::NonIndexable => "Non-Indexable",
        }
    }
}

impl std::fmt::Display for Indexability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The analysis output for one page
///
/// Exactly one `PageStats` exists per distinct URL visited in a session;
/// created once per fetch event and never mutated after insertion into the
/// session map.
#[derive(Debug, Clone, PartialEq)]
pub struct PageStats {
    pub url: String,
    pub domain: String,
    pub status_code: u16,
    pub status: String,
    pub indexability: Indexability,
    pub content_type: String,
    pub title: String,
    pub title_length: usize,
    pub meta_description: String,
    pub meta_description_length: usize,
    pub meta_keywords: String,
    pub meta_keywords_count: usize,
    pub size: usize,
    pub word_count: usize,
    pub crawl_depth: usize,
    pub inlinks: usize,
    pub unique_inlinks: usize,
    pub outlinks: usize,
    pub unique_outlinks: usize,
    pub response_time_millis: u64,
    pub emails: String,
}

/// Analyzes one fetched page into its SEO metrics.
///
/// # Errors
///
/// * `MalformedPageUrl` - the event URL cannot be parsed
/// * `UnparsableBody` - the response body is not valid UTF-8
pub fn analyze_page(event: &PageFetchEvent) -> Result<PageStats, AnalyzeError> {
    let page_url = Url::parse(&event.url).map_err(|source| AnalyzeError::MalformedPageUrl {
        url: event.url.clone(),
        source,
    })?;
    let hostname = page_url.host_str().unwrap_or("").to_ascii_lowercase();

    let body = std::str::from_utf8(&event.body).map_err(|_| AnalyzeError::UnparsableBody {
        url: event.url.clone(),
    })?;
    let document = Html::parse_document(body);

    let title = extract_title(&document);
    let meta_description = extract_meta_content(&document, "description").unwrap_or_default();
    let meta_keywords = extract_meta_content(&document, "keywords").unwrap_or_default();
    let meta_keywords_count = if meta_keywords.is_empty() {
        0
    } else {
        meta_keywords.split(',').count()
    };

    let links = extract_links(&document);
    let (inlinks, unique_inlinks, outlinks, unique_outlinks) = count_links(&hostname, &links);

    Ok(PageStats {
        url: event.url.clone(),
        domain: hostname.clone(),
        status_code: event.status_code,
        status: status_text(event.status_code),
        indexability: classify_indexability(event, &hostname, &document),
        content_type: header_value(event, "content-type"),
        title_length: title.len(),
        title,
        meta_description_length: meta_description.len(),
        meta_description,
        meta_keywords,
        meta_keywords_count,
        size: event.body.len(),
        word_count: count_words(&strip_html(body)),
        crawl_depth: event.depth,
        inlinks,
        unique_inlinks,
        outlinks,
        unique_outlinks,
        response_time_millis: event.elapsed.as_millis() as u64,
        emails: extract_emails(&event.body).join(";"),
    })
}

/// Canonical reason phrase for an HTTP status code, e.g. "Not Found".
fn status_text(code: u16) -> String {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

fn header_value(event: &PageFetchEvent, name: &str) -> String {
    event
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Classifies a page as `Indexable` or `Non-Indexable`.
///
/// A page is non-indexable if any of the following hold:
/// - its status code is outside the 2xx range
/// - an `X-Robots-Tag` response header contains `noindex`
/// - a `<meta name="robots">` content contains `noindex`
/// - a `<link rel="canonical">` points at a different hostname
fn classify_indexability(
    event: &PageFetchEvent,
    hostname: &str,
    document: &Html,
) -> Indexability {
    if event.status_code / 100 != 2 {
        return Indexability::NonIndexable;
    }

    let robots_header = event
        .headers
        .get_all("x-robots-tag")
        .iter()
        .any(|v| v.to_str().map(|s| s.contains(NOINDEX)).unwrap_or(false));
    if robots_header {
        return Indexability::NonIndexable;
    }

    if has_noindex_meta(document) {
        return Indexability::NonIndexable;
    }

    if has_cross_host_canonical(hostname, document) {
        return Indexability::NonIndexable;
    }

    Indexability::Indexable
}

fn has_noindex_meta(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[name][content]") else {
        return false;
    };
    document.select(&selector).any(|element| {
        let name = element.value().attr("name").unwrap_or("");
        let content = element.value().attr("content").unwrap_or("");
        name.eq_ignore_ascii_case("robots") && content.contains(NOINDEX)
    })
}

fn has_cross_host_canonical(hostname: &str, document: &Html) -> bool {
    let Ok(selector) = Selector::parse("link[rel='canonical'][href]") else {
        return false;
    };
    document.select(&selector).any(|element| {
        let href = element.value().attr("href").unwrap_or("");
        match Url::parse(href) {
            Ok(canonical) => canonical
                .host_str()
                .map(|h| !h.eq_ignore_ascii_case(hostname))
                .unwrap_or(false),
            Err(_) => false,
        }
    })
}

/// Collects every `a[href]` value, case-folded, mapping each distinct href
/// to its occurrence count.
fn extract_links(document: &Html) -> HashMap<String, usize> {
    let mut links = HashMap::new();
    let Ok(selector) = Selector::parse("a[href]") else {
        return links;
    };
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            *links.entry(href.to_lowercase()).or_insert(0) += 1;
        }
    }
    links
}

/// Splits an href occurrence map into (inlinks, unique inlinks, outlinks,
/// unique outlinks).
///
/// Only hrefs that parse as absolute URIs are classified; a differing (or
/// absent) hostname makes the href external. Relative hrefs are excluded
/// from both totals.
fn count_links(hostname: &str, links: &HashMap<String, usize>) -> (usize, usize, usize, usize) {
    let mut inlinks = 0;
    let mut unique_inlinks = 0;
    let mut outlinks = 0;
    let mut unique_outlinks = 0;

    for (href, count) in links {
        let Ok(parsed) = Url::parse(href) else {
            continue;
        };
        let same_host = parsed
            .host_str()
            .map(|h| h.eq_ignore_ascii_case(hostname))
            .unwrap_or(false);
        if same_host {
            inlinks += count;
            unique_inlinks += 1;
        } else {
            outlinks += count;
            unique_outlinks += 1;
        }
    }

    (inlinks, unique_inlinks, outlinks, unique_outlinks)
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Returns the `content` attribute of the first `<meta>` whose `name`
/// matches (case-insensitively).
fn extract_meta_content(document: &Html, meta_name: &str) -> Option<String> {
    let selector = Selector::parse("meta[name][content]").ok()?;
    document.select(&selector).find_map(|element| {
        let name = element.value().attr("name")?;
        if name.eq_ignore_ascii_case(meta_name) {
            element.value().attr("content").map(str::to_string)
        } else {
            None
        }
    })
}

/// Strips all markup from an HTML fragment, keeping text content only.
pub fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    document.root_element().text().collect::<String>()
}

/// Counts maximal runs of characters that are neither whitespace nor
/// punctuation.
pub fn count_words(text: &str) -> usize {
    let mut words = 0;
    let mut in_word = false;
    for c in text.chars() {
        if c.is_whitespace() || c.is_ascii_punctuation() {
            in_word = false;
        } else if !in_word {
            in_word = true;
            words += 1;
        }
    }
    words
}
