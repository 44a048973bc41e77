//! Domain allowlist preparation
//!
//! A crawl session is only allowed to follow links into a fixed set of
//! origins derived from its seed host: the bare domain, its `www.` variant,
//! and the four scheme-qualified combinations. This allowlist is the sole
//! domain-scoping mechanism; there is no wildcard or suffix matching, so
//! sibling subdomains beyond `www` are never followed.

use crate::SitegaugeError;
use url::Url;

/// Removes an `http://` or `https://` prefix from a seed string.
pub fn trim_scheme(seed: &str) -> &str {
    seed.strip_prefix("https://")
        .or_else(|| seed.strip_prefix("http://"))
        .unwrap_or(seed)
}

/// Computes the six origins a session may traverse into.
///
/// The seed is normalized to `https://` for parsing, then the hostname is
/// trimmed of the leading character set `{'w', '.'}`. Note this trims
/// characters, not the substring `"www."`: a host starting with `wwx` loses
/// its leading `w`s too. Kept as-is to match the established report output;
/// see the quirk test below.
///
/// Returns `InvalidSeedUrl` if the seed cannot be parsed as a URL with a
/// host.
pub fn prepare_allowed_domains(seed: &str) -> Result<Vec<String>, SitegaugeError> {
    let normalized = format!("https://{}", trim_scheme(seed));
    let parsed = Url::parse(&normalized).map_err(|e| SitegaugeError::InvalidSeedUrl {
        seed: seed.to_string(),
        reason: e.to_string(),
    })?;
    let hostname = parsed
        .host_str()
        .ok_or_else(|| SitegaugeError::InvalidSeedUrl {
            seed: seed.to_string(),
            reason: "missing host".to_string(),
        })?;

    let domain = hostname.trim_start_matches(['w', '.']);

    Ok(vec![
        domain.to_string(),
        format!("www.{}", domain),
        format!("http://{}", domain),
        format!("https://{}", domain),
        format!("http://www.{}", domain),
        format!("https://www.{}", domain),
    ])
}
