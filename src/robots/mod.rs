//! Robots.txt handling module
//!
//! This module provides functionality for fetching and parsing robots.txt
//! and the per-crawl gate that answers fetch-permission queries.

mod gate;
mod parser;

pub use gate::{RobotsGate, MAX_CRAWL_DELAY};
pub use parser::RobotsRules;

use reqwest::Client;
use thiserror::Error;
use url::Url;

/// Failure to obtain robots.txt over the network
#[derive(Debug, Error)]
pub enum RobotsFetchError {
    #[error("request for {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// Fetches and parses robots.txt
///
/// A response that is not a success (404 and friends) means the site has no
/// robots.txt, so everything is allowed. Only transport failures are
/// reported as errors.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - Absolute URL of the robots.txt file
pub async fn fetch_robots(client: &Client, robots_url: &Url) -> Result<RobotsRules, RobotsFetchError> {
    let network_error = |source: reqwest::Error| RobotsFetchError::Network {
        url: robots_url.to_string(),
        source,
    };

    let response = client
        .get(robots_url.clone())
        .send()
        .await
        .map_err(network_error)?;

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned {}; treating as allow-all",
            robots_url,
            response.status()
        );
        return Ok(RobotsRules::unrestricted());
    }

    let bytes = response.bytes().await.map_err(network_error)?;
    Ok(RobotsRules::parse(&String::from_utf8_lossy(&bytes)))
}
