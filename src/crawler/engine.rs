//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties together:
//! - Frontier traversal (breadth-first)
//! - Scope and robots checks
//! - Politeness delay and fetching
//! - Extraction, length gate and dedup
//! - Link discovery and progress events

use crate::config::{validate_crawl_config, Config, CrawlConfig, ExtractionConfig};
use crate::crawler::dedup::{fingerprint, Deduplicator};
use crate::crawler::events::{progress_fraction, CrawlEvent, StopHandle};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOutcome};
use crate::crawler::frontier::Frontier;
use crate::crawler::links::extract_links;
use crate::extract::{extract_document, ExtractedPage, Section};
use crate::output::CrawlStats;
use crate::robots::RobotsGate;
use crate::state::{CrawlState, PageOutcome};
use crate::url::{normalize_parsed, normalize_url, UrlPolicy};
use crate::{HarvestError, Result, UrlError};
use reqwest::Client;
use scraper::Html;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

/// One extracted, non-duplicate page
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    /// Normalized URL the page was fetched from
    pub url: String,

    pub title: String,

    #[serde(rename = "content_markdown")]
    pub body_markdown: String,

    pub sections: Vec<Section>,

    /// Hex SHA-256 of the normalized body text
    pub content_hash: String,
}

impl PageResult {
    /// Distinct layout tags of the page's sections, in first-seen order
    pub fn layouts(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for section in &self.sections {
            let name = section.layout.as_str();
            if !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

/// Everything a finished crawl hands back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct CrawlOutput {
    pub base_url: String,

    pub state: CrawlState,

    /// Saved pages in the order they were saved
    pub pages: Vec<PageResult>,

    pub stats: CrawlStats,

    /// Non-fatal problems worth surfacing (e.g. robots.txt unreachable)
    pub warnings: Vec<String>,
}

impl CrawlOutput {
    /// Host of the crawled site
    pub fn host(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

/// Main crawl engine
///
/// Owns the frontier, the content-hash set and the result list for exactly
/// one crawl. Nothing is shared; progress leaves through an optional event
/// channel and cancellation comes in through a [`StopHandle`].
pub struct CrawlEngine {
    crawl: CrawlConfig,
    extraction: ExtractionConfig,
    base_url: Url,
    /// The base URL as configured (minus fragment), which is what gets requested
    seed: Url,
    policy: UrlPolicy,
    robots: RobotsGate,
    client: Client,
    frontier: Frontier,
    dedup: Deduplicator,
    results: Vec<PageResult>,
    result_index: HashMap<String, usize>,
    rejected: HashSet<String>,
    stats: CrawlStats,
    warnings: Vec<String>,
    state: CrawlState,
    processed: u32,
    events: Option<UnboundedSender<CrawlEvent>>,
    stop: StopHandle,
}

impl CrawlEngine {
    /// Creates an engine for one crawl
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid (empty or malformed base URL,
    /// out-of-range budget, unknown preset) or the HTTP client cannot be
    /// built. Nothing is fetched here.
    pub fn new(crawl: CrawlConfig, extraction: ExtractionConfig) -> Result<Self> {
        validate_crawl_config(&crawl)?;

        let base_url = normalize_url(&crawl.base_url, crawl.query_strings)?;
        let seed = seed_url(&crawl.base_url)?;
        let policy = UrlPolicy::from_config(&crawl)?;
        let robots = RobotsGate::new(&base_url, crawl.respect_robots, &crawl.user_agent)?;
        let client = build_http_client(&crawl.user_agent)?;

        Ok(Self {
            frontier: Frontier::with_seed(base_url.clone()),
            crawl,
            extraction,
            base_url,
            seed,
            policy,
            robots,
            client,
            dedup: Deduplicator::new(),
            results: Vec::new(),
            result_index: HashMap::new(),
            rejected: HashSet::new(),
            stats: CrawlStats::new(),
            warnings: Vec::new(),
            state: CrawlState::Idle,
            processed: 0,
            events: None,
            stop: StopHandle::new(),
        })
    }

    /// Creates an engine from a full configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.crawl.clone(), config.extraction.clone())
    }

    /// Sends progress events to `sender`
    pub fn with_events(mut self, sender: UnboundedSender<CrawlEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Returns a handle that can stop the crawl from another task
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Looks up a saved page by normalized URL
    pub fn page(&self, url: &str) -> Option<&PageResult> {
        self.result_index.get(url).map(|&i| &self.results[i])
    }

    /// Runs the crawl to completion (or until stopped)
    ///
    /// # Loop
    ///
    /// 1. Pop the next URL (BFS order)
    /// 2. Skip it if out of scope or disallowed by robots.txt
    /// 3. Wait out the politeness delay
    /// 4. Fetch; non-HTML and failures still consume the budget
    /// 5. Extract, apply the length gate and dedup, store the page
    /// 6. Discover and enqueue in-scope links (not in single-page mode)
    /// 7. Emit a progress event
    ///
    /// Ends `Completed` when the frontier empties or the budget is spent,
    /// `Stopped` when a stop was requested.
    pub async fn run(&mut self) -> Result<CrawlOutput> {
        self.transition(CrawlState::Running)?;

        let max_pages = self.crawl.effective_max_pages();
        tracing::info!(
            "Starting crawl of {} (budget {} pages)",
            self.base_url,
            max_pages
        );
        self.emit(CrawlEvent::Started {
            base_url: self.base_url.to_string(),
            max_pages,
        });

        if let Some(e) = self.robots.ensure_loaded(&self.client).await {
            let robots_url = self.robots.robots_url().to_string();
            self.warnings
                .push(format!("robots.txt unavailable at {}: {}", robots_url, e));
            self.emit(CrawlEvent::RobotsUnavailable {
                robots_url,
                error: e.to_string(),
            });
        }

        let delay = self.politeness_delay();
        let start_time = std::time::Instant::now();

        let final_state = loop {
            if self.stop.is_stop_requested() {
                tracing::info!("Stop requested, ending crawl");
                break CrawlState::Stopped;
            }

            if self.processed >= max_pages {
                tracing::info!("Page budget of {} exhausted", max_pages);
                break CrawlState::Completed;
            }

            let Some(url) = self.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break CrawlState::Completed;
            };

            if let Some(rejection) = self.policy.check(&url) {
                tracing::debug!("Skipping {}: {}", url, rejection);
                self.reject(&url, PageOutcome::Excluded);
                continue;
            }

            let target = self.fetch_target(&url);

            if !self.robots.can_fetch(&target) {
                tracing::info!("URL {} disallowed by robots.txt", url);
                self.reject(&url, PageOutcome::RobotsDisallowed);
                continue;
            }

            if self.processed > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.processed += 1;
            tracing::debug!("Fetching {} ({}/{})", target, self.processed, max_pages);

            let outcome = self.process_url(&url, &target).await;
            self.stats.record(outcome);
            if !outcome.is_saved() {
                self.emit(CrawlEvent::Skipped {
                    url: url.to_string(),
                    reason: outcome,
                });
            }

            self.emit(CrawlEvent::Progress {
                processed: self.processed,
                saved: self.saved(),
                queue: self.frontier.len(),
                fraction: progress_fraction(self.processed, max_pages),
            });
        };

        self.transition(final_state)?;

        self.emit(CrawlEvent::Progress {
            processed: self.processed,
            saved: self.saved(),
            queue: self.frontier.len(),
            fraction: 1.0,
        });
        self.emit(CrawlEvent::Finished {
            state: final_state,
            processed: self.processed,
            saved: self.saved(),
        });

        tracing::info!(
            "Crawl {}: {} pages fetched, {} saved, {} URLs visited in {:?}",
            final_state,
            self.processed,
            self.saved(),
            self.frontier.visited_count(),
            start_time.elapsed()
        );

        Ok(CrawlOutput {
            base_url: self.base_url.to_string(),
            state: final_state,
            pages: self.results.clone(),
            stats: self.stats.clone(),
            warnings: self.warnings.clone(),
        })
    }

    /// Fetches `target` and processes it as `url`, returning its outcome
    async fn process_url(&mut self, url: &Url, target: &Url) -> PageOutcome {
        match fetch_url(&self.client, target).await {
            FetchOutcome::Success {
                final_url, body, ..
            } => self.handle_page(url, &final_url, &body),

            FetchOutcome::NonHtml { content_type } => {
                tracing::debug!("Skipping {}: not HTML ({})", url, content_type);
                PageOutcome::NonHtml
            }

            FetchOutcome::HttpError { status_code } => {
                tracing::warn!("HTTP {} for {}", status_code, url);
                PageOutcome::HttpError
            }

            FetchOutcome::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                PageOutcome::NetworkError
            }
        }
    }

    /// Extracts a fetched HTML page, stores it if kept, and enqueues links
    fn handle_page(&mut self, url: &Url, final_url: &Url, body: &str) -> PageOutcome {
        let queries = self.policy.query_policy();

        if let Ok(target) = normalize_parsed(final_url.clone(), queries) {
            if target != *url {
                tracing::debug!("{} redirected to {}", url, target);
                self.frontier.mark_visited(&target);
            }
        }

        let (links, page) = self.parse_page(url, final_url, body);

        for link in links {
            self.enqueue(link);
        }

        let ExtractedPage {
            title,
            body: markdown,
            sections,
        } = page;

        let Some(markdown) = markdown else {
            tracing::debug!("Discarding {}: content below minimum length", url);
            return PageOutcome::TooShort;
        };

        let content_hash = fingerprint(&markdown);
        if !self.dedup.keep_fingerprint(content_hash.clone()) {
            tracing::debug!("Discarding {}: duplicate content", url);
            return PageOutcome::Duplicate;
        }

        tracing::info!("Saved {} ({} sections)", url, sections.len());
        self.result_index
            .insert(url.to_string(), self.results.len());
        self.results.push(PageResult {
            url: url.to_string(),
            title,
            body_markdown: markdown,
            sections,
            content_hash,
        });

        PageOutcome::Saved
    }

    /// Parses the body once for links (raw document) and content (cleaned)
    fn parse_page(&mut self, url: &Url, final_url: &Url, body: &str) -> (Vec<Url>, ExtractedPage) {
        let document = Html::parse_document(body);

        let links = if self.crawl.single_page_mode {
            Vec::new()
        } else {
            extract_links(&document, final_url)
        };
        self.stats.links_discovered += links.len() as u64;

        (links, extract_document(document, url, &self.extraction))
    }

    /// Filters a discovered link through the scope policy and queues it
    fn enqueue(&mut self, link: Url) {
        if let Some(rejection) = self.policy.check(&link) {
            tracing::trace!("Not following {}: {}", link, rejection);
            if matches!(rejection, crate::url::ScopeRejection::Excluded) {
                if let Ok(normalized) = normalize_parsed(link, self.policy.query_policy()) {
                    self.reject(&normalized, PageOutcome::Excluded);
                }
            }
            return;
        }

        match normalize_parsed(link, self.policy.query_policy()) {
            Ok(normalized) => {
                if self.frontier.push(normalized.clone()) {
                    tracing::trace!("Queued {}", normalized);
                }
            }
            Err(e) => tracing::trace!("Dropping unnormalizable link: {}", e),
        }
    }

    /// Records a never-fetched URL once
    fn reject(&mut self, url: &Url, outcome: PageOutcome) {
        if !self.rejected.insert(url.to_string()) {
            return;
        }

        self.stats.record(outcome);
        self.emit(CrawlEvent::Skipped {
            url: url.to_string(),
            reason: outcome,
        });
    }

    /// The address requested for `url`
    ///
    /// Only the seed differs from its identity: it is requested exactly as
    /// configured, query string included.
    fn fetch_target(&self, url: &Url) -> Url {
        if *url == self.base_url {
            self.seed.clone()
        } else {
            url.clone()
        }
    }

    /// Configured delay, raised to the robots.txt Crawl-delay when respected
    fn politeness_delay(&self) -> Duration {
        let configured = Duration::from_millis(self.crawl.request_delay);

        match self.robots.crawl_delay() {
            Some(crawl_delay) if crawl_delay > configured => {
                tracing::info!("Honoring robots.txt Crawl-delay of {:?}", crawl_delay);
                crawl_delay
            }
            _ => configured,
        }
    }

    fn saved(&self) -> u32 {
        u32::try_from(self.results.len()).unwrap_or(u32::MAX)
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Crawl state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver only means nobody is listening
            let _ = sender.send(event);
        }
    }
}

/// Parses the configured base URL for fetching, dropping only the fragment
fn seed_url(raw: &str) -> std::result::Result<Url, UrlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    url.set_fragment(None);
    Ok(url)
}
