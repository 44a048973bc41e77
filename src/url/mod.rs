//! URL handling module for SiteGauge
//!
//! This module prepares the per-session domain allowlist that scopes
//! traversal to the seed's own site.

mod allowlist;

pub use allowlist::{prepare_allowed_domains, trim_scheme};
