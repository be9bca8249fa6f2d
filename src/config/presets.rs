//! Named groups of path exclusions
//!
//! Presets are merged into the configured exclusion substrings before the
//! crawl starts.

use crate::ConfigError;
use std::collections::BTreeSet;

const ECOMMERCE: &[&str] = &["/shop/", "/cart/", "/checkout/", "/product/", "/store/"];
const USER_AREAS: &[&str] = &["/account/", "/login/", "/register/", "/profile/", "/my-"];
const LANGUAGES: &[&str] = &["/es/", "/fr/", "/de/", "/it/", "/pt/", "/ja/", "/zh/", "/ko/"];
const BLOG_NEWS: &[&str] = &["/blog/", "/news/", "/press/", "/media/", "/archive/"];

/// Returns the path substrings of a named preset
///
/// Names are matched case-insensitively; `_` and `-` are interchangeable.
pub fn preset_paths(name: &str) -> Option<&'static [&'static str]> {
    match name.trim().to_lowercase().replace('_', "-").as_str() {
        "ecommerce" | "e-commerce" => Some(ECOMMERCE),
        "user-areas" => Some(USER_AREAS),
        "languages" => Some(LANGUAGES),
        "blog-news" => Some(BLOG_NEWS),
        _ => None,
    }
}

/// Merges explicit exclusions with preset exclusions
///
/// Every entry is lowercased and blank entries are dropped.
///
/// # Errors
///
/// Returns `ConfigError::UnknownPreset` for an unrecognized preset name.
pub fn resolve_exclusions(
    exclude_paths: &[String],
    presets: &[String],
) -> Result<BTreeSet<String>, ConfigError> {
    let mut resolved: BTreeSet<String> = exclude_paths
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    for name in presets {
        let paths = preset_paths(name).ok_or_else(|| ConfigError::UnknownPreset(name.clone()))?;
        resolved.extend(paths.iter().map(|p| p.to_string()));
    }

    Ok(resolved)
}
