//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching
//! - Link discovery
//! - The breadth-first frontier
//! - Content dedup
//! - Overall crawl orchestration and progress events

mod dedup;
mod engine;
mod events;
mod fetcher;
mod frontier;
mod links;

pub use dedup::{fingerprint, Deduplicator};
pub use engine::{CrawlEngine, CrawlOutput, PageResult};
pub use events::{progress_fraction, CrawlEvent, StopHandle};
pub use fetcher::{build_http_client, fetch_url, is_html, FetchOutcome};
pub use frontier::Frontier;
pub use links::{extract_links, resolve_link};

use crate::config::Config;
use crate::Result;
use tokio::sync::mpsc::UnboundedSender;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and robots gate
/// 3. Crawl the site breadth-first within the page budget
/// 4. Return the saved pages with statistics
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `events` - Optional progress channel
pub async fn crawl(config: &Config, events: Option<UnboundedSender<CrawlEvent>>) -> Result<CrawlOutput> {
    let mut engine = CrawlEngine::from_config(config)?;
    if let Some(sender) = events {
        engine = engine.with_events(sender);
    }

    engine.run().await
}
