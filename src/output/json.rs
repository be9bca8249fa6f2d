//! JSON export
//!
//! Shape: `{source, extracted_at, page_count, pages: [{url, title, sections, content_markdown}]}`

use crate::crawler::CrawlOutput;
use crate::extract::Section;
use crate::output::traits::{Exporter, OutputResult};
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    source: &'a str,
    extracted_at: String,
    page_count: usize,
    pages: Vec<JsonPage<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonPage<'a> {
    url: &'a str,
    title: &'a str,
    sections: &'a [Section],
    content_markdown: &'a str,
}

/// Pretty-printed JSON export
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, output: &CrawlOutput, extracted_at: &DateTime<Local>) -> OutputResult<String> {
        let document = JsonDocument {
            source: &output.base_url,
            extracted_at: extracted_at.to_rfc3339(),
            page_count: output.pages.len(),
            pages: output
                .pages
                .iter()
                .map(|page| JsonPage {
                    url: &page.url,
                    title: &page.title,
                    sections: &page.sections,
                    content_markdown: &page.body_markdown,
                })
                .collect(),
        };

        Ok(serde_json::to_string_pretty(&document)?)
    }
}
