//! Email extraction from raw page bytes
//!
//! Pattern-matches plausible email addresses out of a response body and
//! rejects malformed trailing segments (short or purely numeric TLDs).

use regex::bytes::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._-]+@([a-zA-Z0-9_-]+\.)+[a-zA-Z0-9_-]+")
        .expect("hardcoded regex pattern is valid")
});

/// Returns true if the candidate has a plausible domain ending.
///
/// The address must split on `.` into at least two segments, and the final
/// segment must be at least two characters and not a number (rejects
/// `user@host.123` style matches from version strings and the like).
fn is_valid_email(email: &str) -> bool {
    let Some(ending) = email.rsplit('.').next() else {
        return false;
    };
    if ending.len() == email.len() {
        // No dot at all.
        return false;
    }
    if ending.len() < 2 {
        return false;
    }
    ending.parse::<i64>().is_err()
}

/// Scans raw bytes for email addresses.
///
/// Matches are deduplicated by exact string equality, preserving first-seen
/// order. The returned sequence may be empty.
pub fn extract_emails(body: &[u8]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for m in EMAIL_REGEX.find_iter(body) {
        // The pattern is pure ASCII, so every match is valid UTF-8.
        let Ok(email) = std::str::from_utf8(m.as_bytes()) else {
            continue;
        };
        if !is_valid_email(email) {
            continue;
        }
        if found.iter().any(|e| e == email) {
            continue;
        }
        found.push(email.to_string());
    }

    found
}
