//! Segmentation of a content region into classified sections
//!
//! Two strategies, tried in order:
//!
//! 1. **Structural**: `<section>`/`<article>` descendants (outermost only)
//!    plus direct `<div>` children of the region.
//! 2. **Heading slices**: the region's direct children cut before every
//!    `<h1>`/`<h2>`, each slice re-parsed as its own fragment.
//!
//! Sections with less than `min_section_length` characters of text are
//! discarded before they receive a position index.

use super::content::render_markdown;
use super::document::{element_text, static_selector};
use super::layout::{classify, LayoutTag, SectionContext};
use crate::config::ExtractionConfig;
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::sync::LazyLock;
use url::Url;

/// Maximum number of images recorded per section
pub const MAX_SECTION_IMAGES: usize = 5;

/// How a section was delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Section,
    Article,
    Div,
    HeadingSlice,
}

/// An image referenced by a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Absolute image URL
    pub src: String,

    /// Alt text, empty when missing
    pub alt: String,
}

/// A classified block of a page
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub layout: LayoutTag,

    #[serde(rename = "type")]
    pub kind: SectionKind,

    pub heading: Option<String>,

    pub subheading: Option<String>,

    pub has_image: bool,

    /// At most [`MAX_SECTION_IMAGES`] images
    pub images: Vec<ImageRef>,

    #[serde(rename = "content")]
    pub content_markdown: String,
}

static STRUCTURAL: LazyLock<Selector> = LazyLock::new(|| static_selector("section, article"));
static H1: LazyLock<Selector> = LazyLock::new(|| static_selector("h1"));
static H2: LazyLock<Selector> = LazyLock::new(|| static_selector("h2"));
static SUBHEADING: LazyLock<Selector> = LazyLock::new(|| static_selector("h2, h3"));
static IMG: LazyLock<Selector> = LazyLock::new(|| static_selector("img"));

/// Splits a content region into classified sections
///
/// # Arguments
///
/// * `region` - The main-content region of a cleaned document
/// * `page_url` - Used to resolve relative image URLs
/// * `config` - Extraction thresholds
pub fn segment(region: ElementRef<'_>, page_url: &Url, config: &ExtractionConfig) -> Vec<Section> {
    let region = unwrap_wrappers(region);
    let mut sections = Vec::new();

    let structural = structural_children(region);
    if !structural.is_empty() {
        for (element, kind) in structural {
            push_section(element, kind, page_url, config, &mut sections);
        }
        return sections;
    }

    for fragment in heading_slices(region) {
        push_section(
            fragment.root_element(),
            SectionKind::HeadingSlice,
            page_url,
            config,
            &mut sections,
        );
    }

    sections
}

/// Descends through single-child `<div>` wrappers
fn unwrap_wrappers(mut region: ElementRef<'_>) -> ElementRef<'_> {
    loop {
        let mut children = region.children().filter_map(ElementRef::wrap);
        match (children.next(), children.next()) {
            (Some(only), None) if only.value().name() == "div" => region = only,
            _ => return region,
        }
    }
}

fn structural_children(region: ElementRef<'_>) -> Vec<(ElementRef<'_>, SectionKind)> {
    let mut found = Vec::new();

    for child in region.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "section" => found.push((child, SectionKind::Section)),
            "article" => found.push((child, SectionKind::Article)),
            "div" => found.push((child, SectionKind::Div)),
            _ => collect_outermost(child, &mut found),
        }
    }

    found
}

/// Collects `<section>`/`<article>` elements not nested in another one
fn collect_outermost<'a>(parent: ElementRef<'a>, found: &mut Vec<(ElementRef<'a>, SectionKind)>) {
    for element in parent.select(&STRUCTURAL) {
        let nested = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .take_while(|ancestor| ancestor.id() != parent.id())
            .any(|ancestor| matches!(ancestor.value().name(), "section" | "article"));

        if !nested {
            let kind = if element.value().name() == "article" {
                SectionKind::Article
            } else {
                SectionKind::Section
            };
            found.push((element, kind));
        }
    }
}

/// Cuts the region's children before every `<h1>`/`<h2>`
fn heading_slices(region: ElementRef<'_>) -> Vec<Html> {
    let mut slices = Vec::new();
    let mut current = String::new();

    for child in region.children() {
        match child.value() {
            Node::Element(element) => {
                if matches!(element.name(), "h1" | "h2") && !current.trim().is_empty() {
                    slices.push(std::mem::take(&mut current));
                }
                if let Some(element) = ElementRef::wrap(child) {
                    current.push_str(&element.html());
                }
            }
            Node::Text(text) => current.push_str(&escape_text(text)),
            _ => {}
        }
    }

    if !current.trim().is_empty() {
        slices.push(current);
    }

    slices.iter().map(|html| Html::parse_fragment(html)).collect()
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn push_section(
    element: ElementRef<'_>,
    kind: SectionKind,
    page_url: &Url,
    config: &ExtractionConfig,
    sections: &mut Vec<Section>,
) {
    let ctx = SectionContext::new(element, sections.len());
    if ctx.text.chars().count() < config.min_section_length {
        return;
    }

    let layout = classify(&ctx);
    let (heading, subheading) = headings(element);
    let has_image = element.select(&IMG).next().is_some();

    sections.push(Section {
        layout,
        kind,
        heading,
        subheading,
        has_image,
        images: images(element, page_url),
        content_markdown: render_markdown(element, config),
    });
}

/// First h1 (else h2) as heading, first other h2/h3 as subheading
fn headings(element: ElementRef<'_>) -> (Option<String>, Option<String>) {
    let heading = element
        .select(&H1)
        .next()
        .or_else(|| element.select(&H2).next());

    let subheading = element
        .select(&SUBHEADING)
        .find(|h| Some(h.id()) != heading.map(|el| el.id()));

    let text = |el: ElementRef<'_>| Some(element_text(el)).filter(|t| !t.is_empty());
    (heading.and_then(text), subheading.and_then(text))
}

fn images(element: ElementRef<'_>, page_url: &Url) -> Vec<ImageRef> {
    element
        .select(&IMG)
        .filter_map(|img| {
            let value = img.value();
            let src = value
                .attr("src")
                .filter(|s| !s.trim().is_empty() && !s.trim_start().starts_with("data:"))
                .or_else(|| value.attr("data-src"))?;
            let resolved = page_url.join(src.trim()).ok()?;

            Some(ImageRef {
                src: resolved.to_string(),
                alt: value.attr("alt").unwrap_or("").trim().to_string(),
            })
        })
        .take(MAX_SECTION_IMAGES)
        .collect()
}
