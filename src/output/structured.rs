//! Structured Markdown export
//!
//! Like the plain export, but each page is broken into its classified
//! sections:
//!
//! ```text
//! ### Section 1: `hero`
//! **Heading:** Welcome
//! **Subheading:** We build things
//! **Images:**
//! - ![alt](https://example.com/a.jpg)
//!
//! <section content>
//! ```

use crate::crawler::{CrawlOutput, PageResult};
use crate::extract::Section;
use crate::output::markdown::{format_header, format_page_heading};
use crate::output::traits::{Exporter, OutputResult};
use chrono::{DateTime, Local};

/// Section content longer than this is truncated
pub const MAX_SECTION_CHARS: usize = 2000;

/// Appended to truncated section content
pub const TRUNCATION_MARKER: &str = "*[Content truncated...]*";

/// Section-by-section Markdown export
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredExporter;

impl Exporter for StructuredExporter {
    fn name(&self) -> &'static str {
        "structured markdown"
    }

    fn render(&self, output: &CrawlOutput, extracted_at: &DateTime<Local>) -> OutputResult<String> {
        Ok(format_structured(output, extracted_at))
    }
}

/// Formats crawl results as section-structured Markdown
pub fn format_structured(output: &CrawlOutput, extracted_at: &DateTime<Local>) -> String {
    let mut md = format_header(output, extracted_at);

    for page in &output.pages {
        md.push_str(&format_page(page));
        md.push_str("---\n\n");
    }

    md
}

fn format_page(page: &PageResult) -> String {
    let mut md = format_page_heading(page);
    md.push('\n');

    // Pages without sections fall back to the whole body
    if page.sections.is_empty() {
        md.push_str(&truncate(&page.body_markdown));
        md.push_str("\n\n");
        return md;
    }

    for (i, section) in page.sections.iter().enumerate() {
        md.push_str(&format_section(i + 1, section));
    }

    md
}

fn format_section(number: usize, section: &Section) -> String {
    let mut md = format!("### Section {}: `{}`\n", number, section.layout);

    if let Some(heading) = &section.heading {
        md.push_str(&format!("**Heading:** {}\n", heading));
    }
    if let Some(subheading) = &section.subheading {
        md.push_str(&format!("**Subheading:** {}\n", subheading));
    }

    if !section.images.is_empty() {
        md.push_str("**Images:**\n");
        for image in &section.images {
            md.push_str(&format!("- ![{}]({})\n", image.alt, image.src));
        }
    }

    md.push('\n');
    md.push_str(&truncate(&section.content_markdown));
    md.push_str("\n\n");

    md
}

/// Cuts content at [`MAX_SECTION_CHARS`] characters and appends the marker
fn truncate(content: &str) -> String {
    match content.char_indices().nth(MAX_SECTION_CHARS) {
        Some((cut, _)) => format!("{}\n\n{}", content[..cut].trim_end(), TRUNCATION_MARKER),
        None => content.to_string(),
    }
}
