//! Exporter trait and output errors
//!
//! Every export format renders a finished [`CrawlOutput`] into a string;
//! writing it to disk is shared.

use crate::crawler::CrawlOutput;
use chrono::{DateTime, Local};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// An export format for crawl results
pub trait Exporter {
    /// Short name of the format, used in logs
    fn name(&self) -> &'static str;

    /// Renders the crawl results
    ///
    /// # Arguments
    ///
    /// * `output` - The finished crawl
    /// * `extracted_at` - Timestamp written into the export header
    fn render(&self, output: &CrawlOutput, extracted_at: &DateTime<Local>) -> OutputResult<String>;

    /// Renders and writes the export to `path`
    fn write_to(
        &self,
        output: &CrawlOutput,
        extracted_at: &DateTime<Local>,
        path: &Path,
    ) -> OutputResult<()> {
        let rendered = self.render(output, extracted_at)?;

        let mut file = File::create(path)?;
        file.write_all(rendered.as_bytes())?;

        tracing::info!("Wrote {} export to {}", self.name(), path.display());
        Ok(())
    }
}
