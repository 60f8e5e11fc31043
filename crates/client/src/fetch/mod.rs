//! HTTP fetch pipeline with rate limiting, retries and cache degradation.
//!
//! ### Transport
//! - One GET per call; non-2xx is an error, redirects are followed (max 5)
//! - Fixed User-Agent, Accept and Accept-Language headers
//! - Per-attempt timeout enforced by the fetcher
//!
//! ### Resilience
//! - Process-wide minimum spacing between outbound requests
//! - Linear backoff between attempts (`base * attempt`)
//! - Fresh cache hits never touch the network
//! - When every attempt fails, serve the newest cached bytes regardless of TTL

pub mod rate_limit;
pub mod resilient;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url, header};
use std::time::{Duration, Instant};

pub use rate_limit::RateLimiter;
pub use resilient::{CachePolicy, FetchOutcome, FetchSource, ResilientFetcher};
pub use url::{UrlError, as_base, canonicalize, resolve};

use docshelf_core::{AppConfig, Error};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Configuration for the fetch pipeline.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "docshelf/0.1")
    pub user_agent: String,

    /// Accept-Language header (default: "en-US,en;q=0.9")
    pub accept_language: String,

    /// Per-attempt timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Minimum spacing between outbound requests (default: 1s)
    pub request_delay: Duration,

    /// Network attempts per logical fetch (default: 3)
    pub retry_attempts: u32,

    /// Backoff unit between attempts (default: 1s)
    pub backoff_base: Duration,

    /// Primary TTL for content pages in seconds (default: 1h)
    pub primary_ttl_seconds: u64,

    /// Backup TTL as a multiple of the primary TTL (default: 24)
    pub backup_ttl_multiplier: u64,

    /// Primary TTL for section listings in seconds (default: 4h)
    pub section_list_ttl_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            timeout: config.timeout(),
            max_redirects: 5,
            request_delay: config.request_delay(),
            retry_attempts: config.retry_attempts.max(1),
            backoff_base: config.backoff_base(),
            primary_ttl_seconds: config.primary_ttl_seconds,
            backup_ttl_multiplier: config.backup_ttl_multiplier,
            section_list_ttl_seconds: config.section_list_ttl_seconds,
        }
    }
}

/// Response from a single network attempt.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// One network attempt. The fetcher owns retries, timeouts and caching.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<FetchResponse, Error>;
}

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT_HTML));
        let language = header::HeaderValue::from_str(&config.accept_language)
            .map_err(|e| Error::InvalidInput(format!("invalid accept_language: {e}")))?;
        headers.insert(header::ACCEPT_LANGUAGE, language);

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else if let Some(status) = err.status() {
        Error::HttpError(format!("status {}", status.as_u16()))
    } else {
        Error::Network(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let response = self.http.get(url.as_str()).send().await.map_err(classify_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} for {url}", status.as_u16())));
        }

        let final_url = response.url().clone();
        let bytes = response.bytes().await.map_err(classify_reqwest_error)?;

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            final_url,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), final_url, bytes })
    }
}
