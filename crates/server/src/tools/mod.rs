//! MCP tool implementations.
//!
//! This module contains all tools exposed by the docshelf server. Each tool
//! decodes its parameters, delegates to [`docshelf_client::DocsService`] and returns pretty
//! JSON as text content.

pub mod cache;
pub mod fetch_content;
pub mod quality;
pub mod resources;
pub mod search_docs;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use docshelf_core::Error;

pub use cache::{CacheStatsParams, cache_stats_impl};
pub use fetch_content::{FetchContentParams, fetch_content_impl};
pub use quality::quality_stats_impl;
pub use resources::{GetResourceParams, ListSectionsParams, get_resource_impl, list_sections_impl};
pub use search_docs::{SearchDocsParams, search_docs_impl};

/// Encode `output` as a successful text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
