use crate::url::QueryPolicy;
use serde::Deserialize;

/// Browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
///
/// Immutable for the lifetime of one crawl.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Site to crawl; only URLs on this host are fetched
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of fetch attempts for the whole crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Politeness delay before every fetch (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Whether robots.txt directives are honored
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// Fetch only the base URL and follow no links
    #[serde(rename = "single-page-mode", default)]
    pub single_page_mode: bool,

    /// Case-insensitive path substrings that are never crawled
    #[serde(rename = "exclude-paths", default)]
    pub exclude_paths: Vec<String>,

    /// Named exclusion groups merged into `exclude_paths`
    #[serde(rename = "exclude-presets", default)]
    pub exclude_presets: Vec<String>,

    /// How query strings affect scope and URL identity
    #[serde(rename = "query-strings", default)]
    pub query_strings: QueryPolicy,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl CrawlConfig {
    /// Creates a crawl configuration for `base_url` with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_pages: default_max_pages(),
            request_delay: default_request_delay(),
            respect_robots: true,
            single_page_mode: false,
            exclude_paths: Vec::new(),
            exclude_presets: Vec::new(),
            query_strings: QueryPolicy::default(),
            user_agent: default_user_agent(),
        }
    }

    /// Page budget actually applied by the engine
    ///
    /// Single-page mode always forces a budget of one.
    pub fn effective_max_pages(&self) -> u32 {
        if self.single_page_mode {
            1
        } else {
            self.max_pages
        }
    }
}

/// Content extraction thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Bodies shorter than this many characters produce no page result
    #[serde(rename = "min-content-length", default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Minimum word count for paragraphs (0 disables the check)
    #[serde(rename = "min-paragraph-words", default)]
    pub min_paragraph_words: usize,

    /// Sections with less text than this many characters are dropped
    #[serde(rename = "min-section-length", default = "default_min_section_length")]
    pub min_section_length: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            min_paragraph_words: 0,
            min_section_length: default_min_section_length(),
        }
    }
}

/// Export destinations; a missing path disables that export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Plain Markdown export
    #[serde(rename = "markdown-path", default)]
    pub markdown_path: Option<String>,

    /// Markdown export broken down by section
    #[serde(rename = "structured-path", default)]
    pub structured_path: Option<String>,

    /// JSON export
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,
}

fn default_max_pages() -> u32 {
    50
}

fn default_request_delay() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_min_content_length() -> usize {
    150
}

fn default_min_section_length() -> usize {
    50
}
