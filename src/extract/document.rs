//! HTML document parsing and cleanup
//!
//! This module handles:
//! - Removing non-content elements (scripts, navigation, forms, hidden blocks)
//! - Resolving the page title
//! - Locating the main-content region

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Elements removed before any text is extracted
const JUNK_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "meta",
    "link",
    "template",
    "svg",
    "nav",
    "header",
    "footer",
    "aside",
    "form",
    "[aria-hidden=\"true\"]",
    "[hidden]",
    "[role=\"navigation\"]",
    "[role=\"banner\"]",
    "[role=\"contentinfo\"]",
    "[style*=\"display:none\"]",
    "[style*=\"display: none\"]",
    ".cookie-banner",
    ".cookie-notice",
    ".cookie-consent",
    "#cookie-banner",
    ".newsletter",
    ".social-share",
    ".share-buttons",
    ".sidebar",
    ".popup",
    ".modal",
    ".breadcrumb",
    ".breadcrumbs",
    ".skip-link",
    ".sr-only",
    ".visually-hidden",
];

static JUNK: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    JUNK_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
});

static TITLE: LazyLock<Selector> = LazyLock::new(|| static_selector("title"));
static H1: LazyLock<Selector> = LazyLock::new(|| static_selector("h1"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| static_selector("main, [role=\"main\"]"));
static ARTICLE: LazyLock<Selector> = LazyLock::new(|| static_selector("article"));
static CONTENT_HINT: LazyLock<Selector> = LazyLock::new(|| {
    static_selector(
        "div[class*=\"content\"], div[id*=\"content\"], section[class*=\"content\"], section[id*=\"content\"], \
         div[class*=\"main\"], div[id*=\"main\"], section[class*=\"main\"], section[id*=\"main\"], \
         div[class*=\"body\"], div[id*=\"body\"], section[class*=\"body\"], section[id*=\"body\"]",
    )
});
static BODY: LazyLock<Selector> = LazyLock::new(|| static_selector("body"));

/// Parses a selector that is a compile-time constant of this crate
pub(crate) fn static_selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// Parses HTML and removes every non-content element
///
/// Parsing is best-effort and never fails; malformed markup simply yields
/// whatever tree html5ever recovers.
pub fn parse_document(html: &str) -> Html {
    let mut document = Html::parse_document(html);
    clean_document(&mut document);
    document
}

/// Removes junk elements from an already parsed document
pub fn clean_document(document: &mut Html) {
    let junk_ids: Vec<_> = JUNK
        .iter()
        .flat_map(|selector| document.select(selector).map(|element| element.id()))
        .collect();

    for id in junk_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Collapses all runs of whitespace into single spaces and trims
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the whitespace-collapsed text of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Resolves the page title
///
/// # Resolution order
///
/// 1. `<title>` text, cut at the first `|` or the last ` - `
/// 2. First `<h1>` text
/// 3. URL path converted to title case
/// 4. `"Home"`
pub fn resolve_title(document: &Html, page_url: &Url) -> String {
    if let Some(title) = document
        .select(&TITLE)
        .next()
        .map(|el| trim_site_suffix(&element_text(el)))
        .filter(|t| !t.is_empty())
    {
        return title;
    }

    if let Some(h1) = document
        .select(&H1)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
    {
        return h1;
    }

    title_from_path(page_url).unwrap_or_else(|| "Home".to_string())
}

/// Cuts a site-name suffix from a title ("About | Acme", "About - Acme")
fn trim_site_suffix(title: &str) -> String {
    let title = title.split('|').next().unwrap_or(title);
    let title = match title.rfind(" - ") {
        Some(pos) if pos > 0 => &title[..pos],
        _ => title,
    };
    title.trim().to_string()
}

/// Converts `/about-us/our_team` into `About Us Our Team`
fn title_from_path(page_url: &Url) -> Option<String> {
    let words: Vec<String> = page_url
        .path()
        .split(|c: char| c == '/' || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let w = w.rsplit_once('.').map_or(w, |(stem, _)| stem);
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Locates the main-content region of a cleaned document
///
/// # Resolution order
///
/// 1. `<main>` (or `role="main"`)
/// 2. `<article>`
/// 3. First `div`/`section` whose class or id contains "content", "main" or "body"
/// 4. `<body>`
/// 5. The whole document
pub fn main_content(document: &Html) -> ElementRef<'_> {
    for selector in [&*MAIN, &*ARTICLE, &*CONTENT_HINT, &*BODY] {
        if let Some(region) = document.select(selector).next() {
            return region;
        }
    }

    document.root_element()
}
