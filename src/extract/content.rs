//! Reduction of a content region to lightweight Markdown
//!
//! Only block-level text is kept: paragraphs, headings, list items, table
//! cells and blockquotes. Nested blocks are emitted once, by their outermost
//! block ancestor.

use super::document::element_text;
use super::encoding::fix_encoding;
use crate::config::ExtractionConfig;
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

/// Block elements whose text is emitted
const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "td", "th", "blockquote",
];

/// Blocks shorter than this are dropped as noise
pub const MIN_BLOCK_CHARS: usize = 3;

/// Lowercase substrings that mark boilerplate text
pub const JUNK_TEXT_PATTERNS: &[&str] = &[
    "privacy policy",
    "terms of service",
    "terms and conditions",
    "cookie policy",
    "accept cookies",
    "we use cookies",
    "all rights reserved",
    "\u{a9}",
    "follow us on",
    "share on facebook",
    "share on twitter",
    "tweet this",
    "subscribe to",
    "sign up for",
    "enter your email",
];

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex is valid"));

/// Returns true if the text matches a boilerplate pattern
pub fn is_junk_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    JUNK_TEXT_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Renders the block text under `region` as Markdown
///
/// Headings become `#`-prefixed lines surrounded by blank lines, list items
/// become `- ` bullets and blockquotes become `> ` quotes. Runs of three or
/// more newlines are collapsed and the result is trimmed. Mojibake is
/// repaired before returning.
pub fn render_markdown(region: ElementRef<'_>, config: &ExtractionConfig) -> String {
    let mut lines = Vec::new();

    if is_block(region) {
        push_block(region, config, &mut lines);
    } else {
        collect_blocks(region, config, &mut lines);
    }

    let joined = lines.join("\n");
    let collapsed = BLANK_RUNS.replace_all(&joined, "\n\n");
    fix_encoding(collapsed.trim())
}

/// Renders the region and applies the minimum-length gate
///
/// Returns `None` when the rendered Markdown is shorter than
/// `config.min_content_length` characters.
pub fn extract_body(region: ElementRef<'_>, config: &ExtractionConfig) -> Option<String> {
    let markdown = render_markdown(region, config);

    if markdown.chars().count() < config.min_content_length {
        return None;
    }

    Some(markdown)
}

fn is_block(element: ElementRef<'_>) -> bool {
    BLOCK_TAGS.contains(&element.value().name())
}

fn collect_blocks(parent: ElementRef<'_>, config: &ExtractionConfig, lines: &mut Vec<String>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        if is_block(child) {
            push_block(child, config, lines);
        } else {
            collect_blocks(child, config, lines);
        }
    }
}

fn push_block(element: ElementRef<'_>, config: &ExtractionConfig, lines: &mut Vec<String>) {
    let text = element_text(element);
    if text.chars().count() < MIN_BLOCK_CHARS || is_junk_text(&text) {
        return;
    }

    let tag = element.value().name();

    if tag == "p"
        && config.min_paragraph_words > 0
        && text.split_whitespace().count() < config.min_paragraph_words
    {
        return;
    }

    let line = match tag {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            format!("\n{} {}\n", "#".repeat(level), text)
        }
        "li" => format!("- {}", text),
        "blockquote" => format!("> {}", text),
        _ => text,
    };

    lines.push(line);
}
