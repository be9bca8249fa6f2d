//! Content extraction module
//!
//! Turns a fetched HTML page into:
//! - a title
//! - a Markdown body (or nothing, if the page is too thin)
//! - a list of classified sections
//!
//! # Components
//!
//! - `document`: parsing, junk removal, title and main-region lookup
//! - `content`: block walk that renders Markdown
//! - `encoding`: mojibake repair
//! - `sections`: segmentation into sections
//! - `layout`: the layout classification cascade

pub mod content;
pub mod document;
pub mod encoding;
pub mod layout;
pub mod sections;

pub use content::{extract_body, is_junk_text, render_markdown};
pub use document::{main_content, parse_document, resolve_title};
pub use encoding::fix_encoding;
pub use layout::{classify, LayoutTag, SectionContext};
pub use sections::{segment, ImageRef, Section, SectionKind};

use crate::config::ExtractionConfig;
use scraper::Html;
use url::Url;

/// Result of extracting one page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub title: String,

    /// Markdown body, `None` when shorter than the minimum content length
    pub body: Option<String>,

    /// Classified sections; empty when `body` is `None`
    pub sections: Vec<Section>,
}

/// Extracts title, body and sections from raw HTML
pub fn extract_page(html: &str, page_url: &Url, config: &ExtractionConfig) -> ExtractedPage {
    extract_document(Html::parse_document(html), page_url, config)
}

/// Extracts from an already parsed (but not yet cleaned) document
pub fn extract_document(mut document: Html, page_url: &Url, config: &ExtractionConfig) -> ExtractedPage {
    document::clean_document(&mut document);

    let title = fix_encoding(&resolve_title(&document, page_url));
    let region = main_content(&document);

    let body = extract_body(region, config);
    let sections = match body {
        Some(_) => segment(region, page_url, config),
        None => Vec::new(),
    };

    ExtractedPage {
        title,
        body,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_page() {
        let html = r#"<html><head><title>Services | Acme</title></head><body>
            <nav><a href="/">Home</a></nav>
            <main>
              <section><h1>What we do</h1><p>We design and build websites for small businesses across the region, from first sketch to launch day and beyond.</p></section>
              <section class="testimonials"><blockquote>They were fantastic to work with from start to finish.</blockquote></section>
            </main>
            <footer>&copy; 2024 Acme. All rights reserved.</footer>
            </body></html>"#;
        let page_url = Url::parse("https://example.com/services").unwrap();
        let page = extract_page(html, &page_url, &ExtractionConfig::default());

        assert_eq!(page.title, "Services");
        let body = page.body.expect("body should pass the length gate");
        assert!(body.starts_with("# What we do"));
        assert!(!body.contains("Home"));
        assert!(!body.contains("rights reserved"));

        assert_eq!(page.sections.len(), 2);
        assert_eq!(page.sections[0].layout, LayoutTag::Hero);
        assert_eq!(page.sections[1].layout, LayoutTag::Testimonial);
    }

    #[test]
    fn test_thin_page_has_no_body_or_sections() {
        let html = "<html><body><main><p>Hello there</p></main></body></html>";
        let page_url = Url::parse("https://example.com/").unwrap();
        let page = extract_page(html, &page_url, &ExtractionConfig::default());

        assert!(page.body.is_none());
        assert!(page.sections.is_empty());
        assert_eq!(page.title, "Home");
    }
}
