//! cache_stats tool implementation.
//!
//! Reports cache occupancy, optionally purging expired entries first.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use docshelf_client::DocsService;
use docshelf_core::cache::CacheStats;

use crate::tools::json_result;

/// Parameters for the cache_stats tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsParams {
    /// Drop entries past their TTL (backups included) before counting.
    #[serde(default)]
    pub purge_expired: bool,
}

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsOutput {
    /// Number of entries purged by this call.
    pub purged: usize,
    pub stats: CacheStats,
    /// Records in the search index; unaffected by purging.
    pub indexed_records: usize,
}

/// Implementation of the cache_stats tool.
pub async fn cache_stats_impl(service: &DocsService, params: CacheStatsParams) -> Result<CallToolResult, McpError> {
    let purged = if params.purge_expired { service.purge_expired().await } else { 0 };
    if purged > 0 {
        tracing::info!(purged, "purged expired cache entries");
    }

    let output = CacheStatsOutput {
        purged,
        stats: service.cache_stats().await,
        indexed_records: service.indexed_records().await,
    };
    json_result(&output)
}
