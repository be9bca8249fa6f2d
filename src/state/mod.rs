//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of the crawl as a whole (idle, running, completed, stopped)
//! - `PageOutcome`: what happened to each URL taken from the frontier

mod crawl_state;
mod page_outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_outcome::PageOutcome;
