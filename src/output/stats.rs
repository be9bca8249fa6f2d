//! Crawl statistics
//!
//! This module tallies page outcomes during a crawl and prints them once the
//! crawl is over.

use crate::state::PageOutcome;
use serde::Serialize;
use std::collections::BTreeMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStats {
    /// Count of URLs by outcome
    pub pages_by_outcome: BTreeMap<PageOutcome, u64>,

    /// Links discovered across all pages, before scope filtering
    pub links_discovered: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one URL outcome
    pub fn record(&mut self, outcome: PageOutcome) {
        *self.pages_by_outcome.entry(outcome).or_insert(0) += 1;
    }

    /// Count for one outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Number of URLs that were actually requested
    pub fn fetched(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.was_fetched())
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of URLs with any outcome
    pub fn total(&self) -> u64 {
        self.pages_by_outcome.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs considered: {}", stats.total());
    println!("  URLs fetched: {}", stats.fetched());
    println!("  Pages saved: {}", stats.count(PageOutcome::Saved));
    println!("  Links discovered: {}", stats.links_discovered);
    println!();

    println!("Pages by Outcome:");
    // Sort outcomes by count (descending)
    let mut outcome_counts: Vec<_> = stats.pages_by_outcome.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1));

    let total = stats.total();
    for (outcome, count) in outcome_counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_count() {
        let mut stats = CrawlStats::new();
        stats.record(PageOutcome::Saved);
        stats.record(PageOutcome::Saved);
        stats.record(PageOutcome::Duplicate);
        stats.record(PageOutcome::Excluded);

        assert_eq!(stats.count(PageOutcome::Saved), 2);
        assert_eq!(stats.count(PageOutcome::TooShort), 0);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.fetched(), 3);
    }

    #[test]
    fn test_serializes_outcome_names() {
        let mut stats = CrawlStats::new();
        stats.record(PageOutcome::NonHtml);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pages_by_outcome"]["non_html"], 1);
    }
}
