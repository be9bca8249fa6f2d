//! Per-crawl robots.txt gate
//!
//! The gate loads robots.txt once, on first use, and fails open: when the
//! file cannot be fetched the crawl proceeds without restrictions.

use crate::robots::{fetch_robots, RobotsRules, RobotsFetchError};
use crate::UrlError;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Crawl-delay values above this are capped
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Answers fetch-permission queries for one site
#[derive(Debug)]
pub struct RobotsGate {
    respect: bool,
    robots_url: Url,
    agent_token: String,
    robots: Option<RobotsRules>,
    loaded: bool,
}

impl RobotsGate {
    /// Creates a gate for the site of `base_url`
    ///
    /// Nothing is fetched until [`RobotsGate::ensure_loaded`] is called.
    pub fn new(base_url: &Url, respect: bool, user_agent: &str) -> Result<Self, UrlError> {
        let robots_url = base_url
            .join("/robots.txt")
            .map_err(|e| UrlError::Parse(e.to_string()))?;

        Ok(Self {
            respect,
            robots_url,
            agent_token: agent_token(user_agent),
            robots: None,
            loaded: false,
        })
    }

    /// Where robots.txt is fetched from
    pub fn robots_url(&self) -> &Url {
        &self.robots_url
    }

    /// Fetches robots.txt if that has not happened yet
    ///
    /// Returns the fetch error only from the call that attempted the load
    /// and failed; in that case every URL stays allowed.
    pub async fn ensure_loaded(&mut self, client: &Client) -> Option<RobotsFetchError> {
        if self.loaded || !self.respect {
            return None;
        }
        self.loaded = true;

        match fetch_robots(client, &self.robots_url).await {
            Ok(robots) => {
                tracing::debug!("Loaded robots.txt from {}", self.robots_url);
                self.robots = Some(robots);
                None
            }
            Err(e) => {
                tracing::warn!(
                    "robots.txt unavailable at {} ({}); crawling without restrictions",
                    self.robots_url,
                    e
                );
                self.robots = None;
                Some(e)
            }
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// Always true when robots compliance is disabled or no robots data is
    /// available.
    pub fn can_fetch(&self, url: &Url) -> bool {
        if !self.respect {
            return true;
        }

        match &self.robots {
            Some(robots) => robots.allows(url.as_str(), &self.agent_token),
            None => true,
        }
    }

    /// The Crawl-delay requested by the site, if robots compliance is on
    ///
    /// Capped at [`MAX_CRAWL_DELAY`]; negative or non-numeric values are ignored.
    pub fn crawl_delay(&self) -> Option<Duration> {
        if !self.respect {
            return None;
        }

        self.robots
            .as_ref()
            .and_then(|r| r.crawl_delay(&self.agent_token))
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .and_then(|secs| {
                Duration::try_from_secs_f64(secs.min(MAX_CRAWL_DELAY.as_secs_f64())).ok()
            })
    }

    #[cfg(test)]
    fn with_robots(base_url: &Url, robots: RobotsRules) -> Self {
        let mut gate = Self::new(base_url, true, "TestBot/1.0").unwrap();
        gate.robots = Some(robots);
        gate.loaded = true;
        gate
    }
}

/// Extracts the product token robots.txt groups are matched against
///
/// `Mozilla/5.0 (X11; ...)` becomes `Mozilla`.
fn agent_token(user_agent: &str) -> String {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .filter(|t| !t.is_empty())
        .unwrap_or("*")
        .to_string()
}
