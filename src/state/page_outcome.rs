//! Per-URL outcome definitions
//!
//! Every URL popped from the frontier ends in exactly one outcome.

use serde::Serialize;
use std::fmt;

/// What happened to a URL taken from the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageOutcome {
    // ===== Fetched =====
    /// Extracted and stored as a page result
    Saved,

    /// Body duplicates an already saved page
    Duplicate,

    /// Body shorter than the minimum content length
    TooShort,

    /// Content-Type is not HTML
    NonHtml,

    // ===== Fetch failures =====
    /// Server answered with a non-success status
    HttpError,

    /// Timeout, DNS failure, connection refused, ...
    NetworkError,

    // ===== Never fetched =====
    /// Disallowed by robots.txt
    RobotsDisallowed,

    /// Path hits a configured exclusion
    Excluded,
}

impl PageOutcome {
    /// Returns true if the URL was actually requested
    pub fn was_fetched(&self) -> bool {
        !matches!(self, Self::RobotsDisallowed | Self::Excluded)
    }

    /// Returns true if a page result was stored
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Returns true if this represents a fetch failure
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError | Self::NetworkError)
    }

    /// Returns the snake_case name of the outcome
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Duplicate => "duplicate",
            Self::TooShort => "too_short",
            Self::NonHtml => "non_html",
            Self::HttpError => "http_error",
            Self::NetworkError => "network_error",
            Self::RobotsDisallowed => "robots_disallowed",
            Self::Excluded => "excluded",
        }
    }

    /// Returns all possible outcomes
    pub fn all_outcomes() -> Vec<Self> {
        vec![
            Self::Saved,
            Self::Duplicate,
            Self::TooShort,
            Self::NonHtml,
            Self::HttpError,
            Self::NetworkError,
            Self::RobotsDisallowed,
            Self::Excluded,
        ]
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
