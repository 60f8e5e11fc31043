//! get_resource and list_sections tool implementations.
//!
//! Resource URIs:
//! - `docs://sections`: JSON list of section links on the base URL (from the
//!   index when the origin is down)
//! - `docs://records/<id>`: body (or snippet) of an indexed record
//! - `docs://page/<path>`: content of a page, fetched if needed
//! - `docs://quality`: JSON quality statistics

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use docshelf_client::{DocsService, SectionLink};

use super::json_result;

/// Input parameters for get_resource tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetResourceParams {
    /// A `docs://` resource URI.
    pub uri: String,
}

/// Output structure for get_resource tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetResourceOutput {
    pub uri: String,
    pub found: bool,
    pub content: Option<String>,
}

/// Input parameters for list_sections tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListSectionsParams {
    /// Index page to read; defaults to the documentation base URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Output structure for list_sections tool.
#[derive(Debug, Clone, Serialize)]
pub struct ListSectionsOutput {
    pub count: usize,
    pub sections: Vec<SectionLink>,
}

/// Implementation of the get_resource tool. Unknown URIs are reported as not found.
pub async fn get_resource_impl(service: &DocsService, params: GetResourceParams) -> Result<CallToolResult, McpError> {
    let content = service.get_resource(&params.uri).await?;
    json_result(&GetResourceOutput { uri: params.uri, found: content.is_some(), content })
}

/// Implementation of the list_sections tool.
pub async fn list_sections_impl(
    service: &DocsService, params: ListSectionsParams,
) -> Result<CallToolResult, McpError> {
    let sections = service.list_sections(params.url.as_deref()).await?;
    json_result(&ListSectionsOutput { count: sections.len(), sections })
}
