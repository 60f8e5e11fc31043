//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (DOCSHELF_*)
//! 2. TOML config file (if DOCSHELF_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (DOCSHELF_*)
/// 2. TOML config file (if DOCSHELF_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin that relative content paths resolve against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header for outbound requests.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Minimum interval between outbound requests in milliseconds.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Network attempts per logical fetch.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Backoff unit between attempts; the n-th retry waits n times this.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// TTL of the primary cache slot for content pages.
    #[serde(default = "default_primary_ttl_seconds")]
    pub primary_ttl_seconds: u64,

    /// Backup slot TTL as a multiple of the primary TTL.
    #[serde(default = "default_backup_ttl_multiplier")]
    pub backup_ttl_multiplier: u64,

    /// TTL of the primary cache slot for section listings.
    #[serde(default = "default_section_list_ttl_seconds")]
    pub section_list_ttl_seconds: u64,

    /// Upper bound on cached entries; `None` keeps the cache unbounded.
    #[serde(default)]
    pub cache_max_entries: Option<usize>,

    /// Longest accepted search query, in characters.
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Result cap used when the caller gives no limit.
    #[serde(default = "default_search_limit")]
    pub default_search_limit: usize,

    /// Number of quality samples kept in the rolling window.
    #[serde(default = "default_quality_window")]
    pub quality_window: usize,

    /// Target fraction of non-fallback retrievals.
    #[serde(default = "default_sla_target")]
    pub sla_target: f64,

    /// Content shorter than this is suspected to be a placeholder.
    #[serde(default = "default_fallback_min_length")]
    pub fallback_min_length: usize,

    /// Phrases that mark placeholder content. Empty keeps the built-in list.
    #[serde(default)]
    pub fallback_indicators: Vec<String>,

    /// Synonym entries merged over the built-in table.
    #[serde(default)]
    pub extra_synonyms: BTreeMap<String, Vec<String>>,

    /// Optional pre-built index (JSON object of id -> record) loaded at startup.
    #[serde(default)]
    pub seed_index_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://developer.apple.com/design/human-interface-guidelines/".into()
}

fn default_user_agent() -> String {
    "docshelf/0.1".into()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".into()
}

fn default_request_delay_ms() -> u64 {
    1_000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_primary_ttl_seconds() -> u64 {
    3_600
}

fn default_backup_ttl_multiplier() -> u64 {
    24
}

fn default_section_list_ttl_seconds() -> u64 {
    14_400
}

fn default_max_query_length() -> usize {
    100
}

fn default_search_limit() -> usize {
    10
}

fn default_quality_window() -> usize {
    1_000
}

fn default_sla_target() -> f64 {
    0.95
}

fn default_fallback_min_length() -> usize {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            request_delay_ms: default_request_delay_ms(),
            retry_attempts: default_retry_attempts(),
            timeout_ms: default_timeout_ms(),
            backoff_base_ms: default_backoff_base_ms(),
            primary_ttl_seconds: default_primary_ttl_seconds(),
            backup_ttl_multiplier: default_backup_ttl_multiplier(),
            section_list_ttl_seconds: default_section_list_ttl_seconds(),
            cache_max_entries: None,
            max_query_length: default_max_query_length(),
            default_search_limit: default_search_limit(),
            quality_window: default_quality_window(),
            sla_target: default_sla_target(),
            fallback_min_length: default_fallback_min_length(),
            fallback_indicators: Vec::new(),
            extra_synonyms: BTreeMap::new(),
            seed_index_path: None,
        }
    }
}

impl AppConfig {
    /// Per-attempt timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Minimum spacing of outbound requests.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Backup slot TTL derived from the primary TTL and multiplier.
    pub fn backup_ttl_seconds(&self) -> u64 {
        self.primary_ttl_seconds.saturating_mul(self.backup_ttl_multiplier)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `DOCSHELF_`
    /// 2. TOML file from `DOCSHELF_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("DOCSHELF_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("DOCSHELF_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
