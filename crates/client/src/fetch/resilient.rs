//! Cache-aware fetcher with a shared rate gate, bounded retries and stale fallback.

use std::sync::Arc;

use reqwest::Url;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use docshelf_core::cache::{PAGE_NAMESPACE, SECTIONS_NAMESPACE, url_cache_key};
use docshelf_core::{Error, TieredCache};

use super::{FetchConfig, RateLimiter, Transport};

/// Where and for how long a fetched body is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub namespace: &'static str,
    pub primary_ttl_seconds: u64,
    pub backup_ttl_seconds: u64,
}

impl CachePolicy {
    /// Content pages: primary TTL with a backup `multiplier` times longer.
    pub fn page(config: &FetchConfig) -> Self {
        Self::with_namespace(PAGE_NAMESPACE, config.primary_ttl_seconds, config.backup_ttl_multiplier)
    }

    /// Section listings change less often than pages.
    pub fn sections(config: &FetchConfig) -> Self {
        Self::with_namespace(SECTIONS_NAMESPACE, config.section_list_ttl_seconds, config.backup_ttl_multiplier)
    }

    fn with_namespace(namespace: &'static str, primary_ttl_seconds: u64, multiplier: u64) -> Self {
        Self { namespace, primary_ttl_seconds, backup_ttl_seconds: primary_ttl_seconds.saturating_mul(multiplier) }
    }
}

/// How a fetch was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchSource {
    /// Fresh primary entry; no network call.
    Cache,
    Network,
    /// Every attempt failed; served retained bytes past their TTL.
    Stale,
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub url: Url,
    pub content: String,
    pub source: FetchSource,
    /// Network attempts spent, zero for cache hits.
    pub attempts: u32,
}

/// Rate-limited, retrying HTTP fetcher that writes through a [`TieredCache`].
///
/// Clones share the transport, the rate gate and the cache.
#[derive(Clone)]
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    limiter: Arc<RateLimiter>,
    cache: TieredCache<String>,
    config: FetchConfig,
}

impl std::fmt::Debug for ResilientFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientFetcher")
            .field("limiter", &self.limiter)
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

impl ResilientFetcher {
    pub fn new(config: FetchConfig, transport: Arc<dyn Transport>, cache: TieredCache<String>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.request_delay));
        Self { transport, limiter, cache, config }
    }

    /// Share an existing rate gate instead of the fetcher's own.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn cache(&self) -> &TieredCache<String> {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch a content page with the page cache policy.
    pub async fn fetch(&self, url: &Url) -> Result<FetchOutcome, Error> {
        self.fetch_with(url, CachePolicy::page(&self.config)).await
    }

    pub async fn fetch_with(&self, url: &Url, policy: CachePolicy) -> Result<FetchOutcome, Error> {
        self.fetch_cancellable(url, policy, &CancellationToken::new()).await
    }

    /// Fetch `url`, giving up with [`Error::Cancelled`] once `cancel` fires.
    ///
    /// Cancellation never writes the cache.
    pub async fn fetch_cancellable(
        &self, url: &Url, policy: CachePolicy, cancel: &CancellationToken,
    ) -> Result<FetchOutcome, Error> {
        let key = url_cache_key(policy.namespace, url.as_str());

        if let Some(read) = self.cache.get_with_fallback(&key).await {
            if !read.is_stale {
                tracing::debug!(%url, "cache hit");
                return Ok(FetchOutcome { url: url.clone(), content: read.value, source: FetchSource::Cache, attempts: 0 });
            }
            tracing::debug!(%url, "primary expired, backup available; refreshing");
        }

        let max_attempts = self.config.retry_attempts.max(1);
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < max_attempts {
            if cancel.is_cancelled() {
                return Err(cancelled(url));
            }
            if attempts > 0 {
                let backoff = self.config.backoff_base.saturating_mul(attempts);
                tracing::debug!(%url, attempt = attempts + 1, backoff_ms = backoff.as_millis() as u64, "retrying");
                tokio::select! {
                    _ = cancel.cancelled() => return Err(cancelled(url)),
                    _ = tokio::time::sleep(backoff) => {}
                }
            }

            attempts += 1;
            match self.attempt(url, cancel).await {
                Ok(content) => {
                    self.cache
                        .set_with_degradation(&key, content.clone(), policy.primary_ttl_seconds, policy.backup_ttl_seconds)
                        .await;
                    return Ok(FetchOutcome { url: url.clone(), content, source: FetchSource::Network, attempts });
                }
                Err(err @ Error::Cancelled(_)) => return Err(err),
                Err(err) => {
                    tracing::warn!(%url, attempt = attempts, max_attempts, error = %err, "fetch attempt failed");
                    let retryable = err.is_retryable();
                    last_error = Some(err);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        if let Some(content) = self.cache.get_stale(&key).await {
            tracing::warn!(%url, attempts, "origin unavailable, serving stale content");
            return Ok(FetchOutcome { url: url.clone(), content, source: FetchSource::Stale, attempts });
        }

        let last_error = last_error.unwrap_or_else(|| Error::Network(format!("no attempt made for {url}")));
        Err(Error::FetchExhausted { url: url.to_string(), attempts, last_error: Box::new(last_error) })
    }

    /// One pass through the rate gate and one bounded network call.
    async fn attempt(&self, url: &Url, cancel: &CancellationToken) -> Result<String, Error> {
        tokio::select! {
            _ = cancel.cancelled() => Err(cancelled(url)),
            result = async {
                self.limiter.acquire().await;
                match tokio::time::timeout(self.config.timeout, self.transport.get(url)).await {
                    Ok(response) => response.map(|r| r.text()),
                    Err(_) => Err(Error::FetchTimeout(format!(
                        "{url} exceeded {}ms",
                        self.config.timeout.as_millis()
                    ))),
                }
            } => result,
        }
    }
}

fn cancelled(url: &Url) -> Error {
    Error::Cancelled(format!("fetch of {url} cancelled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, Step};
    use docshelf_core::CacheEntry;
    use std::time::Duration;

    fn config() -> FetchConfig {
        FetchConfig {
            request_delay: Duration::from_millis(1_000),
            retry_attempts: 3,
            timeout: Duration::from_millis(10_000),
            backoff_base: Duration::from_millis(1_000),
            ..FetchConfig::default()
        }
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://docs.example.com/{path}")).unwrap()
    }

    fn fetcher(transport: &Arc<ScriptedTransport>) -> ResilientFetcher {
        ResilientFetcher::new(config(), transport.clone(), TieredCache::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_timing_out_url_exhausts_after_three_attempts() {
        let transport = Arc::new(ScriptedTransport::always(Step::Hang));
        let fetcher = fetcher(&transport);

        let err = fetcher.fetch(&url("buttons")).await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        match err {
            Error::FetchExhausted { attempts, last_error, .. } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last_error, Error::FetchTimeout(_)));
            }
            other => panic!("expected FetchExhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_never_exceed_configured_bound() {
        for attempts in 1..=4 {
            let transport = Arc::new(ScriptedTransport::always(Step::Status(503)));
            let fetcher = ResilientFetcher::new(
                FetchConfig { retry_attempts: attempts, ..config() },
                transport.clone(),
                TieredCache::new(),
            );
            assert!(fetcher.fetch(&url("alerts")).await.is_err());
            assert_eq!(transport.calls(), attempts as usize);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_and_writes_both_slots() {
        let target = url("toggles");
        let transport = Arc::new(
            ScriptedTransport::default().route(target.as_str(), [Step::Refused, Step::Html("<h1>Toggles</h1>".into())]),
        );
        let fetcher = fetcher(&transport);

        let outcome = fetcher.fetch(&target).await.unwrap();
        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.content, "<h1>Toggles</h1>");

        let key = url_cache_key(PAGE_NAMESPACE, target.as_str());
        let stats = fetcher.cache().stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.backups, 1);
        assert_eq!(fetcher.cache().get(&key).await.as_deref(), Some("<h1>Toggles</h1>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_is_linear_and_skipped_after_last_attempt() {
        let transport = Arc::new(ScriptedTransport::always(Step::Refused));
        let fetcher = ResilientFetcher::new(
            FetchConfig { request_delay: Duration::ZERO, ..config() },
            transport.clone(),
            TieredCache::new(),
        );

        let start = tokio::time::Instant::now();
        assert!(fetcher.fetch(&url("menus")).await.is_err());

        // 1s after the first failure, 2s after the second, none after the third.
        let times = transport.call_times();
        assert_eq!(times.len(), 3);
        assert_eq!(times[1] - times[0], Duration::from_millis(1_000));
        assert_eq!(times[2] - times[1], Duration::from_millis(2_000));
        assert_eq!(start.elapsed(), Duration::from_millis(3_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_fetches_respect_rate_gate() {
        let transport = Arc::new(ScriptedTransport::always(Step::Html("<p>ok</p>".into())));
        let fetcher = fetcher(&transport);

        fetcher.fetch(&url("a")).await.unwrap();
        fetcher.fetch(&url("b")).await.unwrap();
        fetcher.fetch(&url("c")).await.unwrap();

        let times = transport.call_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1_000));
        }
        assert!(times[2] - times[0] >= Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_rate_gate() {
        let transport = Arc::new(ScriptedTransport::always(Step::Html("<p>ok</p>".into())));
        let fetcher = fetcher(&transport);

        let mut handles = Vec::new();
        for path in ["a", "b", "c", "d"] {
            let fetcher = fetcher.clone();
            handles.push(tokio::spawn(async move { fetcher.fetch(&url(path)).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut times = transport.call_times();
        times.sort();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(1_000));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_hit_skips_network() {
        let transport = Arc::new(ScriptedTransport::always(Step::Refused));
        let fetcher = fetcher(&transport);
        let target = url("buttons");
        let key = url_cache_key(PAGE_NAMESPACE, target.as_str());
        fetcher.cache().set(&key, "cached".to_string(), 3_600).await;

        let outcome = fetcher.fetch(&target).await.unwrap();
        assert_eq!(outcome.source, FetchSource::Cache);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(outcome.content, "cached");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_serves_expired_content() {
        let transport = Arc::new(ScriptedTransport::always(Step::Status(500)));
        let fetcher = fetcher(&transport);
        let target = url("buttons");
        let key = url_cache_key(PAGE_NAMESPACE, target.as_str());
        let long_ago = chrono::Utc::now() - chrono::TimeDelta::days(30);
        fetcher.cache().restore(&key, CacheEntry::stored_at("old body".to_string(), long_ago, 60)).await;

        let outcome = fetcher.fetch(&target).await.unwrap();
        assert_eq!(outcome.source, FetchSource::Stale);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.content, "old body");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_backup_triggers_refresh() {
        let target = url("sliders");
        let transport = Arc::new(ScriptedTransport::default().route(target.as_str(), [Step::Html("new".into())]));
        let fetcher = fetcher(&transport);
        let key = url_cache_key(PAGE_NAMESPACE, target.as_str());
        let earlier = chrono::Utc::now() - chrono::TimeDelta::hours(2);
        fetcher.cache().restore(&key, CacheEntry::stored_at("old".to_string(), earlier, 60)).await;
        fetcher
            .cache()
            .restore(&docshelf_core::cache::backup_key(&key), CacheEntry::stored_at("old".to_string(), earlier, 86_400))
            .await;

        let outcome = fetcher.fetch(&target).await.unwrap();
        assert_eq!(outcome.source, FetchSource::Network);
        assert_eq!(outcome.content, "new");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_skips_retries_and_cache() {
        let transport = Arc::new(ScriptedTransport::always(Step::Hang));
        let fetcher = fetcher(&transport);
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            canceller.cancel();
        });

        let err = fetcher
            .fetch_cancellable(&url("buttons"), CachePolicy::page(fetcher.config()), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled(_)));
        assert_eq!(transport.calls(), 1);
        assert!(fetcher.cache().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_makes_no_attempt() {
        let transport = Arc::new(ScriptedTransport::always(Step::Refused));
        let fetcher = fetcher(&transport);
        let token = CancellationToken::new();
        token.cancel();

        let err = fetcher.fetch_cancellable(&url("buttons"), CachePolicy::page(fetcher.config()), &token).await;
        assert!(matches!(err, Err(Error::Cancelled(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_section_policy_uses_own_namespace() {
        let target = url("");
        let transport = Arc::new(ScriptedTransport::always(Step::Html("<a href=\"x\">x</a>".into())));
        let fetcher = fetcher(&transport);

        let policy = CachePolicy::sections(fetcher.config());
        assert_eq!(policy.primary_ttl_seconds, 14_400);
        assert_eq!(policy.backup_ttl_seconds, 14_400 * 24);

        fetcher.fetch_with(&target, policy).await.unwrap();
        let key = url_cache_key(SECTIONS_NAMESPACE, target.as_str());
        assert!(fetcher.cache().get(&key).await.is_some());
        assert!(fetcher.cache().get(&url_cache_key(PAGE_NAMESPACE, target.as_str())).await.is_none());
    }
}
