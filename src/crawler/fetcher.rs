//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent
//! - GET requests that follow redirects
//! - Content-Type filtering (only `text/html` bodies are returned)
//! - Error classification

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Maximum redirect hops followed per request
pub const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Content-Type header value
        content_type: String,
        /// Page body, decoded lossily as UTF-8
        body: String,
    },

    /// Page is not HTML (Content-Type mismatch)
    NonHtml {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if the Content-Type denotes an HTML document
pub fn is_html(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("text/html")
}

/// Fetches a URL
///
/// # Response Handling
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 2xx with `text/html` | Success |
/// | 2xx with another Content-Type | NonHtml |
/// | Any other status | HttpError |
/// | Timeout, DNS, connection, TLS failure | NetworkError |
///
/// Bodies are decoded as UTF-8 with invalid sequences replaced, so a
/// mislabelled charset never fails the fetch.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return network_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html(&content_type) {
        return FetchOutcome::NonHtml { content_type };
    }

    match response.bytes().await {
        Ok(bytes) => FetchOutcome::Success {
            final_url,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        },
        Err(e) => network_error(e),
    }
}

fn network_error(e: reqwest::Error) -> FetchOutcome {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else {
        e.to_string()
    };

    FetchOutcome::NetworkError { error }
}
