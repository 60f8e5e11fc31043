//! quality_stats tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use docshelf_client::DocsService;

use super::json_result;

/// Implementation of the quality_stats tool: statistics over the current window.
pub async fn quality_stats_impl(service: &DocsService) -> Result<CallToolResult, McpError> {
    json_result(&service.quality_statistics().await)
}
