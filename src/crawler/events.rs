//! Progress events and cancellation
//!
//! The engine never renders anything itself. Callers that want progress pass
//! an unbounded channel sender; callers that want to cancel keep a
//! [`StopHandle`].

use crate::state::{CrawlState, PageOutcome};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Something the caller may want to know while a crawl runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    /// The crawl loop is starting
    Started { base_url: String, max_pages: u32 },

    /// Emitted once per fetch attempt, and once more at the end with
    /// `fraction == 1.0`
    Progress {
        processed: u32,
        saved: u32,
        queue: usize,
        fraction: f64,
    },

    /// A URL was not kept; `reason` says why
    Skipped { url: String, reason: PageOutcome },

    /// robots.txt could not be fetched; the crawl continues unrestricted
    RobotsUnavailable { robots_url: String, error: String },

    /// The crawl reached a terminal state
    Finished {
        state: CrawlState,
        processed: u32,
        saved: u32,
    },
}

/// Fraction of the page budget consumed, capped at 1.0
pub fn progress_fraction(processed: u32, max_pages: u32) -> f64 {
    if max_pages == 0 {
        return 1.0;
    }

    (f64::from(processed) / f64::from(max_pages)).min(1.0)
}

/// Cloneable handle that asks a running crawl to stop
///
/// The engine checks the flag between iterations: a fetch already in flight
/// completes and its page is kept, then the crawl ends in
/// [`CrawlState::Stopped`].
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop
    pub fn stop(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Returns true once a stop was requested
    pub fn is_stop_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
