//! URL handling module for Sumi-Harvest
//!
//! This module provides URL normalization (the identity used for the
//! visited set and the result map) and the crawl scope policy.

mod normalize;
mod policy;

use serde::Deserialize;

// Re-export main functions
pub use normalize::{normalize_parsed, normalize_url};
pub use policy::{ScopeRejection, UrlPolicy, SKIP_EXTENSIONS};

/// How query strings are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryPolicy {
    /// Query strings are dropped from the URL identity
    #[default]
    Strip,
    /// URLs carrying a query string are out of scope
    Reject,
    /// Query strings are part of the identity (tracking parameters removed)
    Keep,
}
