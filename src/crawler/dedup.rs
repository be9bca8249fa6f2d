//! Duplicate detection by content fingerprint
//!
//! The fingerprint is SHA-256 over the whitespace-collapsed, lowercased body
//! text, so pages that differ only in spacing or case count as duplicates.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Computes the hex-encoded fingerprint of a page body
pub fn fingerprint(body: &str) -> String {
    let normalized = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Remembers fingerprints of saved pages
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a body is seen, false for duplicates
    pub fn should_keep(&mut self, body: &str) -> bool {
        self.keep_fingerprint(fingerprint(body))
    }

    /// Same as [`Deduplicator::should_keep`] for an already computed fingerprint
    pub fn keep_fingerprint(&mut self, fingerprint: String) -> bool {
        self.seen.insert(fingerprint)
    }

    /// Number of distinct bodies seen
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
