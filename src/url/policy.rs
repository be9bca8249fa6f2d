//! Crawl scope decisions for discovered URLs

use crate::config::{resolve_exclusions, CrawlConfig};
use crate::url::QueryPolicy;
use crate::{ConfigError, UrlError};
use std::fmt;
use url::Url;

/// Extensions of resources that never contain page text
pub const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".mp3", ".mp4", ".avi", ".mov",
    ".zip", ".tar", ".gz", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
];

/// Why a URL fell outside the crawl scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRejection {
    /// Not an HTTP(S) URL
    UnsupportedScheme,
    /// Host (or port) differs from the base URL
    ForeignHost,
    /// Path ends with a non-text extension
    SkippedExtension,
    /// Path contains a configured exclusion substring
    Excluded,
    /// URL carries a query string while query rejection is enabled
    QueryString,
}

impl fmt::Display for ScopeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnsupportedScheme => "unsupported scheme",
            Self::ForeignHost => "foreign host",
            Self::SkippedExtension => "non-text extension",
            Self::Excluded => "excluded path",
            Self::QueryString => "query string",
        };
        f.write_str(text)
    }
}

/// Decides whether a URL belongs to the crawl
///
/// The policy is a pure function of the URL: it holds no visited-set and has
/// no side effects. Exclusions are matched as case-insensitive substrings of
/// the path, so an exclusion of `/es/` also matches `/testes/`.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    base_host: String,
    base_port: Option<u16>,
    excluded: Vec<String>,
    queries: QueryPolicy,
}

impl UrlPolicy {
    /// Creates a policy scoped to the host of `base_url`
    pub fn new(
        base_url: &Url,
        excluded: impl IntoIterator<Item = String>,
        queries: QueryPolicy,
    ) -> Result<Self, UrlError> {
        let base_host = base_url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(UrlError::MissingHost)?
            .to_lowercase();

        Ok(Self {
            base_host,
            base_port: base_url.port_or_known_default(),
            excluded: excluded
                .into_iter()
                .map(|e| e.to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            queries,
        })
    }

    /// Builds the policy described by a crawl configuration
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let excluded = resolve_exclusions(&config.exclude_paths, &config.exclude_presets)?;

        Self::new(&base_url, excluded, config.query_strings)
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))
    }

    /// Returns true if the URL is in scope
    pub fn is_in_scope(&self, url: &Url) -> bool {
        self.check(url).is_none()
    }

    /// Applies the scope rules in order and reports the first one violated
    ///
    /// 1. Host must equal the base host
    /// 2. Path must not end with a non-text extension
    /// 3. Path must not contain an excluded substring
    /// 4. No query string when query rejection is enabled
    pub fn check(&self, url: &Url) -> Option<ScopeRejection> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Some(ScopeRejection::UnsupportedScheme);
        }

        let same_host = url
            .host_str()
            .is_some_and(|h| h.eq_ignore_ascii_case(&self.base_host));
        if !same_host || url.port_or_known_default() != self.base_port {
            return Some(ScopeRejection::ForeignHost);
        }

        let path = url.path().to_lowercase();

        if SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return Some(ScopeRejection::SkippedExtension);
        }

        if self.excluded.iter().any(|e| path.contains(e.as_str())) {
            return Some(ScopeRejection::Excluded);
        }

        if self.queries == QueryPolicy::Reject && url.query().is_some() {
            return Some(ScopeRejection::QueryString);
        }

        None
    }

    /// Returns true if the URL path hits a configured exclusion
    pub fn is_excluded(&self, url: &Url) -> bool {
        let path = url.path().to_lowercase();
        self.excluded.iter().any(|e| path.contains(e.as_str()))
    }

    /// The lowercase host every in-scope URL must have
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    /// How query strings are treated
    pub fn query_policy(&self) -> QueryPolicy {
        self.queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(excluded: &[&str], queries: QueryPolicy) -> UrlPolicy {
        let base = Url::parse("https://example.com/").unwrap();
        UrlPolicy::new(&base, excluded.iter().map(|s| s.to_string()), queries).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_host_in_scope() {
        let p = policy(&[], QueryPolicy::Strip);
        assert!(p.is_in_scope(&url("https://example.com/about")));
        assert!(p.is_in_scope(&url("https://EXAMPLE.com/about")));
    }

    #[test]
    fn test_foreign_host_rejected() {
        let p = policy(&[], QueryPolicy::Strip);
        assert_eq!(p.check(&url("https://other.com/")), Some(ScopeRejection::ForeignHost));
        assert_eq!(p.check(&url("https://blog.example.com/")), Some(ScopeRejection::ForeignHost));
        assert_eq!(p.check(&url("https://example.com:8443/")), Some(ScopeRejection::ForeignHost));
    }

    #[test]
    fn test_non_text_extensions_rejected() {
        let p = policy(&[], QueryPolicy::Strip);
        for path in ["/brochure.pdf", "/img/logo.PNG", "/files/archive.tar.gz", "/deck.pptx"] {
            let u = url(&format!("https://example.com{}", path));
            assert_eq!(p.check(&u), Some(ScopeRejection::SkippedExtension), "{}", path);
        }
        assert!(p.is_in_scope(&url("https://example.com/page.html")));
    }

    #[test]
    fn test_excluded_substring() {
        let p = policy(&["/blog/"], QueryPolicy::Strip);
        assert_eq!(p.check(&url("https://example.com/blog/post-1")), Some(ScopeRejection::Excluded));
        assert_eq!(p.check(&url("https://example.com/BLOG/post-1")), Some(ScopeRejection::Excluded));
        assert!(p.is_in_scope(&url("https://example.com/blogroll")));
    }

    #[test]
    fn test_exclusion_is_substring_not_segment() {
        let p = policy(&["/es/"], QueryPolicy::Strip);
        assert!(p.is_excluded(&url("https://example.com/es/inicio")));
        assert!(p.is_excluded(&url("https://example.com/testes/page")));
    }

    #[test]
    fn test_query_rejection_only_when_enabled() {
        let with_query = url("https://example.com/list?page=2");
        assert!(policy(&[], QueryPolicy::Strip).is_in_scope(&with_query));
        assert!(policy(&[], QueryPolicy::Keep).is_in_scope(&with_query));
        assert_eq!(
            policy(&[], QueryPolicy::Reject).check(&with_query),
            Some(ScopeRejection::QueryString)
        );
    }

    #[test]
    fn test_rule_order() {
        let p = policy(&["/docs/"], QueryPolicy::Reject);
        // Host is checked before extension, extension before exclusion
        assert_eq!(p.check(&url("https://other.com/docs/a.pdf")), Some(ScopeRejection::ForeignHost));
        assert_eq!(p.check(&url("https://example.com/docs/a.pdf")), Some(ScopeRejection::SkippedExtension));
        assert_eq!(p.check(&url("https://example.com/docs/a?x=1")), Some(ScopeRejection::Excluded));
    }

    #[test]
    fn test_unsupported_scheme() {
        let p = policy(&[], QueryPolicy::Strip);
        assert_eq!(p.check(&url("mailto:a@example.com")), Some(ScopeRejection::UnsupportedScheme));
    }

    #[test]
    fn test_from_config_merges_presets() {
        let mut config = CrawlConfig::new("https://example.com");
        config.exclude_presets = vec!["ecommerce".to_string()];
        let p = UrlPolicy::from_config(&config).unwrap();
        assert!(p.is_excluded(&url("https://example.com/cart/items")));
        assert_eq!(p.base_host(), "example.com");
    }
}
