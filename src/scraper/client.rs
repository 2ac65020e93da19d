//! Blocking HTTP client for the archive. One request per page; no retries, delay or caching.

use crate::scraper::error::ScraperError;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://archiveofourown.org";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; ao3scrape/0.1; +https://github.com/ao3scrape)";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;

/// Blocking client bound to one archive base URL.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    inner: reqwest::blocking::Client,
    base_url: Url,
}

impl ArchiveClient {
    /// Client with the default User-Agent, timeout and base URL.
    pub fn new() -> Result<Self, ScraperError> {
        Self::builder().build()
    }

    pub fn builder() -> ArchiveClientBuilder {
        ArchiveClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for `segments` under the base URL. Segments are percent-encoded as needed;
    /// query pairs are form-encoded and omitted entirely when empty.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ScraperError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ScraperError::InvalidUrl {
                input: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET `url` and return the body. A non-success status becomes [`ScraperError::HttpStatus`]
    /// carrying `context` (the operation, e.g. "work 123"), and the body is not read.
    pub fn fetch_html(&self, url: Url, context: &str) -> Result<String, ScraperError> {
        debug!(%url, context, "fetching page");
        let response = self
            .inner
            .get(url.clone())
            .send()
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                source: e,
            })?;
        check_response(response, &url, context)
    }
}

/// Check response status and read body as UTF-8.
fn check_response(
    response: reqwest::blocking::Response,
    url: &Url,
    context: &str,
) -> Result<String, ScraperError> {
    let status = response.status();
    if !status.is_success() {
        debug!(%url, status = status.as_u16(), "retrieval failed");
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
            context: context.to_string(),
        });
    }
    response
        .text()
        .map_err(|e| ScraperError::BodyRead { source: e })
}

/// Builder for [`ArchiveClient`]: User-Agent, timeout, proxy and base URL.
#[derive(Debug)]
pub struct ArchiveClientBuilder {
    user_agent: Option<String>,
    timeout_secs: u64,
    proxy_url: Option<String>,
    base_url: String,
}

impl Default for ArchiveClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy_url: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ArchiveClientBuilder {
    /// Set a custom User-Agent. If not set, a browser-like default is used.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set request timeout in seconds. Default 30.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Route every request through this proxy (http, https or socks URL).
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Point the client at another archive root (mirrors, local test servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn build(self) -> Result<ArchiveClient, ScraperError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ScraperError::InvalidUrl {
            input: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        let mut builder = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(Duration::from_secs(self.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if let Some(proxy_url) = self.proxy_url {
            let proxy =
                reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| ScraperError::InvalidUrl {
                    input: proxy_url.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.proxy(proxy);
        }
        let inner = builder
            .build()
            .map_err(|e| ScraperError::ClientBuild { source: e })?;
        Ok(ArchiveClient { inner, base_url })
    }
}
