use crate::config::presets::resolve_exclusions;
use crate::config::types::{Config, CrawlConfig, ExtractionConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the page budget
const MAX_PAGE_BUDGET: u32 = 10_000;

/// Upper bound on the politeness delay (milliseconds)
const MAX_REQUEST_DELAY: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl configuration
///
/// An empty or malformed base URL is the only configuration problem that
/// prevents a crawl from starting.
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if config.max_pages < 1 || config.max_pages > MAX_PAGE_BUDGET {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGE_BUDGET, config.max_pages
        )));
    }

    if config.request_delay > MAX_REQUEST_DELAY {
        return Err(ConfigError::Validation(format!(
            "request_delay must be <= {}ms, got {}ms",
            MAX_REQUEST_DELAY, config.request_delay
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    resolve_exclusions(&config.exclude_paths, &config.exclude_presets)?;

    Ok(())
}

/// Validates the base URL: non-empty, parseable, HTTP(S), with a host
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    if base_url.trim().is_empty() {
        return Err(ConfigError::InvalidUrl("base_url cannot be empty".to_string()));
    }

    let url = Url::parse(base_url.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use HTTP or HTTPS",
            base_url
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            base_url
        )));
    }

    Ok(())
}

/// Validates extraction thresholds
fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.min_content_length < 1 {
        return Err(ConfigError::Validation(
            "min_content_length must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, path) in [
        ("markdown_path", &config.markdown_path),
        ("structured_path", &config.structured_path),
        ("json_path", &config.json_path),
    ] {
        if matches!(path, Some(p) if p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}
