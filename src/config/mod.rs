//! Configuration module for Sumi-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving named exclusion presets.
//!
//! # Example
//!
//! ```no_run
//! use sumi_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {} (budget {})", config.crawl.base_url, config.crawl.max_pages);
//! ```

mod parser;
mod presets;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, ExtractionConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use presets::{preset_paths, resolve_exclusions};
pub use validation::{validate, validate_crawl_config};
