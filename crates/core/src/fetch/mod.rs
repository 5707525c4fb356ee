//! Blocking HTTP client and page fetching.
//! Gated behind the "fetch" feature flag.

use crate::error::Error;
pub use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use url::Url;

/// Configuration for outbound HTTP.
pub struct FetchConfig {
    /// User-Agent header. The target service may reject or alter behavior
    /// for requests lacking a realistic browser identity.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Redirect chain cap; short links resolve through at least one hop.
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            timeout_secs: 30,
            max_redirects: 10,
        }
    }
}

/// Build the blocking client every fetch and submission goes through.
pub fn build_client(config: &FetchConfig) -> Result<Client, Error> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .build()
        .map_err(|e| Error::Network(e.to_string()))
}

/// GET a page and return its body.
pub fn fetch_html(client: &Client, url: &str) -> Result<String, Error> {
    let parsed = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let response = client
        .get(parsed.as_str())
        .send()
        .map_err(|e| Error::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http(status.as_u16()));
    }

    response.text().map_err(|e| Error::Network(e.to_string()))
}
