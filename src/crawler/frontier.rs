//! Breadth-first crawl frontier
//!
//! URLs are popped in the order they were first discovered. A URL is queued
//! at most once and, once visited, never queued again.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue of normalized URLs with visited/queued bookkeeping
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be fetched, in discovery order
    queue: VecDeque<Url>,

    /// Everything currently in `queue`
    queued: HashSet<String>,

    /// Everything ever popped
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates a frontier seeded with one URL
    pub fn with_seed(seed: Url) -> Self {
        let mut frontier = Self::default();
        frontier.push(seed);
        frontier
    }

    /// Queues a URL unless it was already queued or visited
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        let key = url.as_str();
        if self.visited.contains(key) || self.queued.contains(key) {
            return false;
        }

        self.queued.insert(key.to_string());
        self.queue.push_back(url);
        true
    }

    /// Pops the oldest queued URL and marks it visited
    pub fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        self.visited.insert(url.as_str().to_string());
        Some(url)
    }

    /// Marks a URL visited without fetching it (e.g. a redirect target)
    ///
    /// A copy still waiting in the queue is dropped.
    pub fn mark_visited(&mut self, url: &Url) {
        if self.queued.remove(url.as_str()) {
            self.queue.retain(|queued| queued != url);
        }
        self.visited.insert(url.as_str().to_string());
    }

    /// Returns true if the URL has been popped or marked visited
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of URLs waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs popped or marked visited
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
