//! search_docs tool implementation.
//!
//! Ranks indexed documentation records against a keyword query.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use docshelf_client::DocsService;
use docshelf_core::SearchFilters;

use super::json_result;

/// Input parameters for search_docs tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchDocsParams {
    /// Keyword query, at most 100 characters.
    pub query: String,

    /// Restrict results to a platform (e.g. "ios", "macos").
    #[serde(default)]
    pub platform: Option<String>,

    /// Restrict results to a category (e.g. "components").
    #[serde(default)]
    pub category: Option<String>,

    /// Maximum number of results (default: 10).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Implementation of the search_docs tool.
pub async fn search_docs_impl(service: &DocsService, params: SearchDocsParams) -> Result<CallToolResult, McpError> {
    let filters = SearchFilters { platform: params.platform, category: params.category };
    let results = service.search(&params.query, &filters, params.limit).await?;
    json_result(&results)
}
