//! Markdown export generation
//!
//! This module renders the saved pages as one Markdown document: a header
//! with the site, extraction time and page count, then one `##` block per
//! page separated by horizontal rules.

use crate::crawler::{CrawlOutput, PageResult};
use crate::extract::fix_encoding;
use crate::output::traits::{Exporter, OutputResult};
use chrono::{DateTime, Local};

/// Plain Markdown export
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownExporter;

impl Exporter for MarkdownExporter {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(&self, output: &CrawlOutput, extracted_at: &DateTime<Local>) -> OutputResult<String> {
        Ok(format_markdown(output, extracted_at))
    }
}

/// Formats the document header shared by both Markdown exports
pub fn format_header(output: &CrawlOutput, extracted_at: &DateTime<Local>) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} \u{2013} Scraped Content\n\n", output.host()));
    md.push_str(&format!(
        "*Extracted {}*\n",
        extracted_at.format("%Y-%m-%d %H:%M")
    ));
    md.push_str(&format!("*{} pages*\n\n", output.pages.len()));
    md.push_str("---\n\n");

    md
}

/// Formats the title, URL and layout lines that open a page block
pub fn format_page_heading(page: &PageResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {}\n\n", fix_encoding(&page.title)));
    md.push_str(&format!("**URL:** {}\n", page.url));

    let layouts = page.layouts();
    if !layouts.is_empty() {
        md.push_str(&format!("**Layouts:** {}\n", layouts.join(", ")));
    }

    md
}

/// Formats crawl results as Markdown
///
/// # Arguments
///
/// * `output` - The finished crawl
/// * `extracted_at` - Timestamp for the header
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown(output: &CrawlOutput, extracted_at: &DateTime<Local>) -> String {
    let mut md = format_header(output, extracted_at);

    for page in &output.pages {
        md.push_str(&format_page_heading(page));
        md.push('\n');
        md.push_str(&page.body_markdown);
        md.push_str("\n\n---\n\n");
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_output;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap()
    }

    #[test]
    fn test_header() {
        let md = format_markdown(&sample_output(), &timestamp());

        assert!(md.starts_with("# example.com \u{2013} Scraped Content\n\n"));
        assert!(md.contains("*Extracted 2024-03-05 14:07*\n"));
        assert!(md.contains("*2 pages*\n"));
    }

    #[test]
    fn test_page_blocks() {
        let md = format_markdown(&sample_output(), &timestamp());

        assert!(md.contains("## Home\n\n**URL:** https://example.com/\n**Layouts:** hero, features\n"));
        assert!(md.contains("## About\n\n**URL:** https://example.com/about\n\n"));
        assert!(md.contains("We build websites."));
        assert_eq!(md.matches("\n---\n").count(), 3);
    }

    #[test]
    fn test_exporter_render() {
        let rendered = MarkdownExporter.render(&sample_output(), &timestamp()).unwrap();
        assert_eq!(rendered, format_markdown(&sample_output(), &timestamp()));
        assert_eq!(MarkdownExporter.name(), "markdown");
    }
}
