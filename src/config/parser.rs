use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Max pages: {}", config.crawl.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::QueryPolicy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawl]
base-url = "https://example.com"
max-pages = 20
request-delay = 500
respect-robots = false
exclude-paths = ["/shop/"]
exclude-presets = ["languages"]
query-strings = "reject"

[extraction]
min-content-length = 200

[output]
markdown-path = "./site.md"
json-path = "./site.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.base_url, "https://example.com");
        assert_eq!(config.crawl.max_pages, 20);
        assert_eq!(config.crawl.request_delay, 500);
        assert!(!config.crawl.respect_robots);
        assert_eq!(config.crawl.query_strings, QueryPolicy::Reject);
        assert_eq!(config.extraction.min_content_length, 200);
        assert_eq!(config.extraction.min_section_length, 50);
        assert_eq!(config.output.markdown_path.as_deref(), Some("./site.md"));
        assert!(config.output.structured_path.is_none());
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config("[crawl]\nbase-url = \"https://example.com\"\n").unwrap();

        assert_eq!(config.crawl.max_pages, 50);
        assert_eq!(config.crawl.request_delay, 300);
        assert!(config.crawl.respect_robots);
        assert!(!config.crawl.single_page_mode);
        assert_eq!(config.crawl.query_strings, QueryPolicy::Strip);
        assert!(config.crawl.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.extraction.min_content_length, 150);
        assert_eq!(config.extraction.min_paragraph_words, 0);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawl]
base-url = "https://example.com"
max-pages = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_base_url_is_parse_error() {
        let result = parse_config("[crawl]\nmax-pages = 5\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
