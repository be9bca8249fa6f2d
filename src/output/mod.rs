//! Output module for exporting crawl results
//!
//! This module handles:
//! - Plain Markdown export (one block per page)
//! - Structured Markdown export (one block per classified section)
//! - JSON export
//! - Crawl statistics

mod json;
mod markdown;
pub mod stats;
mod structured;
mod traits;

pub use json::JsonExporter;
pub use markdown::{format_markdown, MarkdownExporter};
pub use stats::{print_statistics, CrawlStats};
pub use structured::{format_structured, StructuredExporter, MAX_SECTION_CHARS, TRUNCATION_MARKER};
pub use traits::{Exporter, OutputError, OutputResult};

use crate::config::OutputConfig;
use crate::crawler::CrawlOutput;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Writes every export configured in `config`
///
/// All exports share one extraction timestamp. Returns the paths written,
/// in the order markdown, structured, json.
///
/// # Arguments
///
/// * `output` - The finished crawl
/// * `config` - Which exports to write and where
pub fn write_exports(output: &CrawlOutput, config: &OutputConfig) -> OutputResult<Vec<PathBuf>> {
    let extracted_at = Local::now();
    let mut written = Vec::new();

    let targets: [(&Option<String>, &dyn Exporter); 3] = [
        (&config.markdown_path, &MarkdownExporter),
        (&config.structured_path, &StructuredExporter),
        (&config.json_path, &JsonExporter),
    ];

    for (path, exporter) in targets {
        if let Some(path) = path {
            let path = Path::new(path);
            exporter.write_to(output, &extracted_at, path)?;
            written.push(path.to_path_buf());
        }
    }

    Ok(written)
}
