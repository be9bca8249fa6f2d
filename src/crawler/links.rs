//! Link discovery
//!
//! Pulls candidate URLs out of `<a href>` elements of the raw (uncleaned)
//! document, so navigation menus still feed the frontier.

use crate::extract::document::static_selector;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| static_selector("a[href]"));

/// Extracts all followable links from a document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document, relative hrefs resolved
///   against `page_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - Fragment-only hrefs (same-page anchors)
/// - Anything that resolves to a non-HTTP(S) URL
///
/// Scope and normalization are applied later by the engine.
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<Url> {
    document
        .select(&ANCHOR)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

/// Resolves an href against the page URL
///
/// Returns None if the link should be ignored.
pub fn resolve_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let absolute = page_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then_some(absolute)
}
