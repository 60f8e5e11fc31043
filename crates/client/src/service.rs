//! Documentation service: the composition root behind the MCP tools.
//!
//! A content request goes cache → network (rate-limited, retried) → stale
//! cache → static fallback document. Every page served is classified,
//! scored into the quality window, and (unless it is placeholder content)
//! indexed for search.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use url::Url;

use docshelf_core::cache::CacheStats;
use docshelf_core::quality::classify_content;
use docshelf_core::{
    AppConfig, ContentClass, ContentRecord, Error, FallbackHeuristics, QualityMonitor, QualitySample,
    QualityStatistics, RelevanceSearchEngine, SearchFilters, SearchResults, SynonymTable, TieredCache,
};

use crate::extract::{SectionLink, build_record, extract_section_links};
use crate::fetch::{
    CachePolicy, FetchConfig, FetchSource, HttpTransport, ResilientFetcher, Transport, as_base, resolve,
};

pub const RESOURCE_SECTIONS: &str = "docs://sections";
pub const RESOURCE_QUALITY: &str = "docs://quality";
pub const RESOURCE_RECORD_PREFIX: &str = "docs://records/";
pub const RESOURCE_PAGE_PREFIX: &str = "docs://page/";

/// Where the content of a [`ContentDocument`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Cache,
    Network,
    Stale,
    /// Generated locally because the origin and cache both failed.
    Fallback,
}

impl From<FetchSource> for ContentSource {
    fn from(source: FetchSource) -> Self {
        match source {
            FetchSource::Cache => ContentSource::Cache,
            FetchSource::Network => ContentSource::Network,
            FetchSource::Stale => ContentSource::Stale,
        }
    }
}

/// A served documentation page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    pub record: ContentRecord,
    pub content: String,
    pub source: ContentSource,
    pub class: ContentClass,
}

/// Owns the fetcher, search index and quality window.
#[derive(Debug)]
pub struct DocsService {
    fetcher: ResilientFetcher,
    base_url: Url,
    index: RwLock<RelevanceSearchEngine>,
    monitor: Mutex<QualityMonitor>,
    heuristics: FallbackHeuristics,
    default_search_limit: usize,
}

impl DocsService {
    /// Build a service over `transport`, loading the seed index if configured.
    pub fn new(config: &AppConfig, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let base_url = as_base(&config.base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let cache = match config.cache_max_entries {
            Some(max) => TieredCache::with_capacity_limit(max),
            None => TieredCache::new(),
        };
        let fetcher = ResilientFetcher::new(FetchConfig::from(config), transport, cache);

        let mut synonyms = SynonymTable::builtin();
        synonyms.extend(config.extra_synonyms.clone());
        let mut index = RelevanceSearchEngine::new(synonyms).with_max_query_length(config.max_query_length);
        if let Some(path) = &config.seed_index_path {
            index.load_seed(path)?;
        }

        Ok(Self {
            fetcher,
            base_url,
            index: RwLock::new(index),
            monitor: Mutex::new(QualityMonitor::new(config.quality_window, config.sla_target)),
            heuristics: FallbackHeuristics::new(config.fallback_min_length, &config.fallback_indicators),
            default_search_limit: config.default_search_limit,
        })
    }

    /// Build a service that talks to the origin over HTTP.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let transport = HttpTransport::new(&FetchConfig::from(config))?;
        Self::new(config, Arc::new(transport))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Retrieve a page by absolute URL or by path under the base URL.
    ///
    /// Never fails once the URL is valid and the fetch was not cancelled:
    /// exhaustion without cached bytes yields a fallback document.
    pub async fn fetch_content(&self, input: &str) -> Result<ContentDocument, Error> {
        self.fetch_content_cancellable(input, &CancellationToken::new()).await
    }

    /// [`fetch_content`](Self::fetch_content) that gives up with
    /// [`Error::Cancelled`] once `cancel` fires. A cancelled fetch records no
    /// quality sample and writes nothing to the cache or index.
    pub async fn fetch_content_cancellable(
        &self, input: &str, cancel: &CancellationToken,
    ) -> Result<ContentDocument, Error> {
        let url = resolve(Some(&self.base_url), input).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let policy = CachePolicy::page(self.fetcher.config());
        let outcome = match self.fetcher.fetch_cancellable(&url, policy, cancel).await {
            Ok(outcome) => outcome,
            Err(err @ Error::FetchExhausted { .. }) => {
                tracing::warn!(%url, error = %err, "serving fallback document");
                return Ok(self.fallback_document(&url).await);
            }
            Err(err) => return Err(err),
        };

        let page = build_record(&outcome.content, &url);
        let class = classify_content(&page.text, &self.heuristics);
        self.monitor
            .lock()
            .await
            .record(QualitySample::assess(&page.record, &page.text, class));

        if class.is_fallback() {
            tracing::warn!(%url, "placeholder content not indexed");
        } else {
            self.index.write().await.upsert(page.record.clone());
        }

        Ok(ContentDocument { record: page.record, content: page.text, source: outcome.source.into(), class })
    }

    async fn fallback_document(&self, url: &Url) -> ContentDocument {
        let skeleton = build_record("", url).record;
        let indexed = self.index.read().await.get(&skeleton.id).cloned();

        let (record, content) = match indexed {
            Some(record) => {
                let content = record.body.clone().unwrap_or_else(|| record.snippet.clone());
                (record, content)
            }
            None => {
                let content = format!(
                    "# {}\n\nThis page is temporarily unavailable. Try again later or open {url} directly.",
                    skeleton.title
                );
                (skeleton, content)
            }
        };

        self.monitor
            .lock()
            .await
            .record(QualitySample::assess(&record, &content, ContentClass::Fallback));

        ContentDocument { record, content, source: ContentSource::Fallback, class: ContentClass::Fallback }
    }

    /// Rank indexed records. `limit` defaults to the configured search limit.
    pub async fn search(
        &self, query: &str, filters: &SearchFilters, limit: Option<usize>,
    ) -> Result<SearchResults, Error> {
        let limit = limit.unwrap_or(self.default_search_limit);
        self.index.read().await.search(query, filters, limit)
    }

    /// Links to documentation pages listed on `input` (the base URL by default).
    ///
    /// When the index page cannot be fetched and nothing is cached, the list is
    /// built from indexed records under that page, or holds the page itself.
    pub async fn list_sections(&self, input: Option<&str>) -> Result<Vec<SectionLink>, Error> {
        let url = match input {
            Some(input) => resolve(Some(&self.base_url), input).map_err(|e| Error::InvalidUrl(e.to_string()))?,
            None => self.base_url.clone(),
        };
        let base = as_base(url.as_str()).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        match self.fetcher.fetch_with(&url, CachePolicy::sections(self.fetcher.config())).await {
            Ok(outcome) => Ok(extract_section_links(&outcome.content, &base)),
            Err(err @ Error::FetchExhausted { .. }) => {
                tracing::warn!(%url, error = %err, "serving section list from the index");
                Ok(self.fallback_sections(&base).await)
            }
            Err(err) => Err(err),
        }
    }

    async fn fallback_sections(&self, base: &Url) -> Vec<SectionLink> {
        let index = self.index.read().await;
        let mut sections: Vec<SectionLink> = index
            .records()
            .iter()
            .filter(|record| record.url.starts_with(base.as_str()) && record.url != base.as_str())
            .map(|record| SectionLink { title: record.title.clone(), url: record.url.clone() })
            .collect();

        if sections.is_empty() {
            let title = build_record("", base).record.title;
            sections.push(SectionLink { title, url: base.to_string() });
        }
        sections
    }

    /// Read a `docs://` resource; unknown URIs yield `None`.
    pub async fn get_resource(&self, uri: &str) -> Result<Option<String>, Error> {
        let uri = uri.trim();
        if uri == RESOURCE_SECTIONS {
            let sections = self.list_sections(None).await?;
            return to_json(&sections).map(Some);
        }
        if uri == RESOURCE_QUALITY {
            return to_json(&self.quality_statistics().await).map(Some);
        }
        if let Some(id) = uri.strip_prefix(RESOURCE_RECORD_PREFIX) {
            let index = self.index.read().await;
            return Ok(index
                .get(id)
                .map(|record| record.body.clone().unwrap_or_else(|| record.snippet.clone())));
        }
        if let Some(path) = uri.strip_prefix(RESOURCE_PAGE_PREFIX) {
            return self.fetch_content(path).await.map(|doc| Some(doc.content));
        }
        Ok(None)
    }

    pub async fn quality_statistics(&self) -> QualityStatistics {
        self.monitor.lock().await.statistics()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.fetcher.cache().stats().await
    }

    /// Drop expired cache entries. Indexed records are unaffected.
    pub async fn purge_expired(&self) -> usize {
        self.fetcher.cache().purge_expired().await
    }

    pub async fn indexed_records(&self) -> usize {
        self.index.read().await.len()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(|e| Error::InvalidInput(format!("failed to encode resource: {e}")))
}
