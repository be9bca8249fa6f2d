//! Layout classification for page sections
//!
//! A section is classified by running an ordered cascade of rules. Each rule
//! is a pure function of the section; the first one that returns a tag wins.
//!
//! # Cascade
//!
//! | # | Rule | Signal |
//! |---|------|--------|
//! | 1 | structural hint | class/id keyword, `<blockquote>`, `<details>` |
//! | 2 | position | first section with h1, large image or background image |
//! | 3 | testimonial | blockquote/cite, or quotes plus an attribution |
//! | 4 | faq | three or more `?`, or a `<details>` element |
//! | 5 | gallery | three or more images |
//! | 6 | pricing | currency or billing period plus a plan keyword |
//! | 7 | features | three or more short list items |
//! | 8 | contact | mailto/tel link plus a contact keyword |
//! | 9 | cta | fewer than 75 words plus an action phrase |
//! | 10 | columns | grid/flex container with 1-4 children, or plain text |

use super::document::{element_text, static_selector};
use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Layout category of a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutTag {
    Hero,
    Testimonial,
    Faq,
    Cta,
    Gallery,
    Pricing,
    Features,
    Team,
    Contact,
    Checklist,
    Process,
    Options,
    Overview,
    OneColumn,
    OneColumnImage,
    TwoColumn,
    TwoColumnImage,
    ThreeColumn,
    ThreeColumnImage,
    FourColumn,
    FourColumnImage,
    SingleColumn,
    Content,
}

impl LayoutTag {
    /// Returns the snake_case name used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Testimonial => "testimonial",
            Self::Faq => "faq",
            Self::Cta => "cta",
            Self::Gallery => "gallery",
            Self::Pricing => "pricing",
            Self::Features => "features",
            Self::Team => "team",
            Self::Contact => "contact",
            Self::Checklist => "checklist",
            Self::Process => "process",
            Self::Options => "options",
            Self::Overview => "overview",
            Self::OneColumn => "one_column",
            Self::OneColumnImage => "one_column_image",
            Self::TwoColumn => "two_column",
            Self::TwoColumnImage => "two_column_image",
            Self::ThreeColumn => "three_column",
            Self::ThreeColumnImage => "three_column_image",
            Self::FourColumn => "four_column",
            Self::FourColumnImage => "four_column_image",
            Self::SingleColumn => "single_column",
            Self::Content => "content",
        }
    }

    /// Maps a column count (1-4) to its tag
    pub fn columns(count: usize, with_image: bool) -> Option<Self> {
        let tag = match (count, with_image) {
            (1, false) => Self::OneColumn,
            (1, true) => Self::OneColumnImage,
            (2, false) => Self::TwoColumn,
            (2, true) => Self::TwoColumnImage,
            (3, false) => Self::ThreeColumn,
            (3, true) => Self::ThreeColumnImage,
            (4, false) => Self::FourColumn,
            (4, true) => Self::FourColumnImage,
            _ => return None,
        };
        Some(tag)
    }
}

impl fmt::Display for LayoutTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the cascade needs to know about one section
#[derive(Debug, Clone)]
pub struct SectionContext<'a> {
    /// Root element of the section
    pub element: ElementRef<'a>,

    /// Position among the retained sections of the page (0-based)
    pub index: usize,

    /// Whitespace-collapsed text of the section
    pub text: String,
}

impl<'a> SectionContext<'a> {
    pub fn new(element: ElementRef<'a>, index: usize) -> Self {
        Self {
            element,
            index,
            text: element_text(element),
        }
    }

    fn count(&self, selector: &Selector) -> usize {
        self.element.select(selector).count()
    }

    fn has(&self, selector: &Selector) -> bool {
        self.element.select(selector).next().is_some()
    }

    fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

type Rule = fn(&SectionContext<'_>) -> Option<LayoutTag>;

/// Classification rules in priority order
const CASCADE: &[Rule] = &[
    structural_hint,
    first_section_hero,
    testimonial,
    faq,
    gallery,
    pricing,
    features,
    contact,
    call_to_action,
    column_layout,
];

/// Classifies a section
///
/// Deterministic: the same section at the same position always yields the
/// same tag. Falls back to [`LayoutTag::Content`] when no rule matches.
pub fn classify(ctx: &SectionContext<'_>) -> LayoutTag {
    CASCADE
        .iter()
        .find_map(|rule| rule(ctx))
        .unwrap_or(LayoutTag::Content)
}

// ===== Structural hints =====

/// Class/id keywords per tag, checked in this order
const HINT_KEYWORDS: &[(LayoutTag, &[&str])] = &[
    (LayoutTag::Hero, &["hero", "banner", "jumbotron", "masthead"]),
    (LayoutTag::Testimonial, &["testimonial", "quote", "review"]),
    (LayoutTag::Faq, &["faq", "accordion"]),
    (LayoutTag::Cta, &["cta", "call-to-action"]),
    (LayoutTag::Gallery, &["gallery", "carousel", "slider"]),
    (LayoutTag::Pricing, &["pricing", "plans"]),
    (LayoutTag::Features, &["features", "benefits", "feature-list"]),
    (LayoutTag::Team, &["team", "staff"]),
    (LayoutTag::Contact, &["contact"]),
    (LayoutTag::Checklist, &["checklist"]),
    (LayoutTag::Process, &["process", "steps", "how-it-works", "timeline"]),
    (LayoutTag::Options, &["options", "choices"]),
    (LayoutTag::Overview, &["overview", "intro", "summary"]),
];

/// Class/id words that contain a keyword without meaning it
const HINT_FALSE_FRIENDS: &[(&str, &[&str])] = &[
    ("review", &["preview", "overview"]),
    ("team", &["steam"]),
    ("cta", &["spectac"]),
];

/// Lowercased class and id of an element
struct Attributes {
    raw: String,
}

impl Attributes {
    fn of(element: ElementRef<'_>) -> Self {
        let value = element.value();
        let raw = format!(
            "{} {}",
            value.attr("class").unwrap_or(""),
            value.attr("id").unwrap_or("")
        )
        .to_lowercase();

        Self { raw }
    }

    /// Substring match, ignoring the keyword's known false friends
    fn matches(&self, keyword: &str) -> bool {
        match HINT_FALSE_FRIENDS.iter().find(|(k, _)| *k == keyword) {
            Some((_, words)) => words
                .iter()
                .fold(self.raw.clone(), |raw, word| raw.replace(word, " "))
                .contains(keyword),
            None => self.raw.contains(keyword),
        }
    }
}

fn hint_for(element: ElementRef<'_>) -> Option<LayoutTag> {
    match element.value().name() {
        "blockquote" => return Some(LayoutTag::Testimonial),
        "details" => return Some(LayoutTag::Faq),
        _ => {}
    }

    let attributes = Attributes::of(element);
    HINT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| attributes.matches(k)))
        .map(|(tag, _)| *tag)
}

/// Returns the element's only element child, if it has exactly one
fn single_child(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut children = element.children().filter_map(ElementRef::wrap);
    let first = children.next()?;
    children.next().is_none().then_some(first)
}

fn structural_hint(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    hint_for(ctx.element).or_else(|| single_child(ctx.element).and_then(hint_for))
}

// ===== Position =====

static H1: LazyLock<Selector> = LazyLock::new(|| static_selector("h1"));
static IMG: LazyLock<Selector> = LazyLock::new(|| static_selector("img"));
static STYLED: LazyLock<Selector> = LazyLock::new(|| static_selector("[style]"));

const LARGE_IMAGE_WIDTH: u32 = 600;
const LARGE_IMAGE_CLASSES: &[&str] = &["large", "full", "cover", "hero", "banner"];

fn is_large_image(img: ElementRef<'_>) -> bool {
    let value = img.value();

    let wide = value
        .attr("width")
        .and_then(|w| w.trim().trim_end_matches("px").parse::<u32>().ok())
        .is_some_and(|w| w >= LARGE_IMAGE_WIDTH);

    wide || value.attr("class").is_some_and(|class| {
        let class = class.to_lowercase();
        LARGE_IMAGE_CLASSES.iter().any(|k| class.contains(k))
    })
}

fn has_background_image(element: ElementRef<'_>) -> bool {
    let styled = |el: ElementRef<'_>| {
        el.value().attr("style").is_some_and(|style| {
            let style = style.to_lowercase();
            style.contains("background-image") || style.contains("url(")
        })
    };

    styled(element) || element.select(&STYLED).any(styled)
}

fn first_section_hero(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    if ctx.index != 0 {
        return None;
    }

    let hero = ctx.has(&H1)
        || ctx.element.select(&IMG).any(is_large_image)
        || has_background_image(ctx.element);

    hero.then_some(LayoutTag::Hero)
}

// ===== Content heuristics =====

static QUOTE_SOURCE: LazyLock<Selector> =
    LazyLock::new(|| static_selector("blockquote, cite, q"));
static DETAILS: LazyLock<Selector> = LazyLock::new(|| static_selector("details"));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| static_selector("li"));
static CONTACT_LINK: LazyLock<Selector> =
    LazyLock::new(|| static_selector("a[href^=\"mailto:\"], a[href^=\"tel:\"]"));

static ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[\x{2014}\x{2013}~]|\s-{1,2})\s*[A-Z][\w.'\x{2019}]+")
        .expect("static regex is valid")
});
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:[$\x{20ac}\x{a3}\x{a5}]\s?\d)|(?:\d\s?(?:usd|eur|gbp)\b)|(?:/\s?(?:mo|month|yr|year)\b)|(?:\bper\s+(?:month|year|user|seat)\b)",
    )
    .expect("static regex is valid")
});
static PLAN_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:plans?|pric(?:e|es|ing)|tiers?|packages?)\b").expect("static regex is valid")
});

const QUOTE_MARKS: &[char] = &['"', '\u{201c}', '\u{201d}', '\u{ab}', '\u{bb}'];

const CONTACT_KEYWORDS: &[&str] = &[
    "contact",
    "email",
    "phone",
    "call",
    "reach",
    "get in touch",
    "address",
    "visit us",
    "write to us",
];

const ACTION_PHRASES: &[&str] = &[
    "book now",
    "get started",
    "sign up",
    "contact us",
    "learn more",
    "request a quote",
    "get a quote",
    "schedule",
    "buy now",
    "shop now",
    "try it free",
    "start your free",
    "call today",
    "call now",
    "get in touch",
    "join now",
    "subscribe",
    "download now",
    "register now",
    "apply now",
];

const MIN_GALLERY_IMAGES: usize = 3;
const MIN_FAQ_QUESTIONS: usize = 3;
const MIN_FEATURE_ITEMS: usize = 3;
const MAX_FEATURE_ITEM_CHARS: usize = 100;
const MAX_CTA_WORDS: usize = 75;

fn testimonial(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    let quoted = ctx.text.contains(QUOTE_MARKS) && ATTRIBUTION.is_match(&ctx.text);
    (ctx.has(&QUOTE_SOURCE) || quoted).then_some(LayoutTag::Testimonial)
}

fn faq(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    let questions = ctx.text.matches('?').count();
    (questions >= MIN_FAQ_QUESTIONS || ctx.has(&DETAILS)).then_some(LayoutTag::Faq)
}

fn gallery(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    (ctx.count(&IMG) >= MIN_GALLERY_IMAGES).then_some(LayoutTag::Gallery)
}

fn pricing(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    (CURRENCY.is_match(&ctx.text) && PLAN_KEYWORD.is_match(&ctx.text)).then_some(LayoutTag::Pricing)
}

fn features(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    let lengths: Vec<usize> = ctx
        .element
        .select(&LIST_ITEM)
        .map(|li| element_text(li).chars().count())
        .collect();

    if lengths.len() < MIN_FEATURE_ITEMS {
        return None;
    }

    let average = lengths.iter().sum::<usize>() / lengths.len();
    (average < MAX_FEATURE_ITEM_CHARS).then_some(LayoutTag::Features)
}

fn contact(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    if !ctx.has(&CONTACT_LINK) {
        return None;
    }

    let lower = ctx.text.to_lowercase();
    CONTACT_KEYWORDS
        .iter()
        .any(|k| lower.contains(k))
        .then_some(LayoutTag::Contact)
}

fn call_to_action(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    if ctx.word_count() >= MAX_CTA_WORDS {
        return None;
    }

    let lower = ctx.text.to_lowercase();
    ACTION_PHRASES
        .iter()
        .any(|p| lower.contains(p))
        .then_some(LayoutTag::Cta)
}

// ===== Columns =====

static TEXT_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| static_selector("p, h1, h2, h3, h4, h5, h6"));

fn is_column_container(element: ElementRef<'_>) -> bool {
    let value = element.value();

    let class_hint = value.attr("class").is_some_and(|class| {
        class.split_whitespace().map(str::to_lowercase).any(|token| {
            token == "row"
                || token == "cols"
                || token.starts_with("grid")
                || token.starts_with("flex")
                || token.starts_with("col-")
                || token.contains("column")
        })
    });

    let style_hint = value.attr("style").is_some_and(|style| {
        let style: String = style.to_lowercase().split_whitespace().collect();
        style.contains("display:grid") || style.contains("display:flex") || style.contains("grid-template-columns")
    });

    class_hint || style_hint
}

fn column_layout(ctx: &SectionContext<'_>) -> Option<LayoutTag> {
    let with_image = ctx.has(&IMG);

    let container = std::iter::once(ctx.element)
        .chain(ctx.element.descendants().skip(1).filter_map(ElementRef::wrap))
        .find(|el| is_column_container(*el));

    if let Some(container) = container {
        let children = container.children().filter_map(ElementRef::wrap).count();
        if let Some(tag) = LayoutTag::columns(children, with_image) {
            return Some(tag);
        }
    }

    if ctx.has(&TEXT_BLOCK) {
        return Some(if with_image {
            LayoutTag::OneColumnImage
        } else {
            LayoutTag::SingleColumn
        });
    }

    None
}
