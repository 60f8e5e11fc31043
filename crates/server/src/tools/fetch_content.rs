//! fetch_content tool implementation.
//!
//! Retrieves a documentation page through the cache/fetch/fallback chain.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use docshelf_client::{CancellationToken, ContentDocument, DocsService};
use docshelf_core::Error;

use super::json_result;

/// Input parameters for fetch_content tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FetchContentParams {
    /// Page path under the documentation base URL (e.g. "buttons"),
    /// or an absolute URL.
    pub path: String,
}

/// Implementation of the fetch_content tool. The fetch stops when `cancel`
/// fires, e.g. when the client cancels the request.
pub async fn fetch_content_impl(
    service: &DocsService, params: FetchContentParams, cancel: &CancellationToken,
) -> Result<CallToolResult, McpError> {
    if params.path.trim().is_empty() {
        return Err(Error::InvalidInput("path cannot be empty".into()).into());
    }

    let document: ContentDocument = service.fetch_content_cancellable(&params.path, cancel).await?;
    json_result(&document)
}
