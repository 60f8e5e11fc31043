//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CacheStatsParams, FetchContentParams, GetResourceParams, ListSectionsParams, SearchDocsParams, cache_stats_impl,
    fetch_content_impl, get_resource_impl, list_sections_impl, quality_stats_impl, search_docs_impl,
};

use docshelf_client::DocsService;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for docshelf.
#[derive(Clone)]
pub struct DocshelfServer {
    service: Arc<DocsService>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl DocshelfServer {
    /// Create a new server handler over a shared service.
    pub fn new(service: Arc<DocsService>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Fetch a documentation page by path or URL. Served from cache when fresh; falls back to stale or placeholder content when the origin is down."
    )]
    async fn fetch_content(
        &self, params: Parameters<FetchContentParams>, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        fetch_content_impl(&self.service, params.0, &context.ct).await
    }

    #[tool(
        description = "Search indexed documentation by keywords with synonym expansion. Optional platform/category filters and result limit."
    )]
    async fn search_docs(&self, params: Parameters<SearchDocsParams>) -> Result<CallToolResult, McpError> {
        search_docs_impl(&self.service, params.0).await
    }

    #[tool(
        description = "Read a docs:// resource: docs://sections, docs://records/<id>, docs://page/<path>, or docs://quality."
    )]
    async fn get_resource(&self, params: Parameters<GetResourceParams>) -> Result<CallToolResult, McpError> {
        get_resource_impl(&self.service, params.0).await
    }

    #[tool(description = "List documentation section links found on an index page (the base URL by default).")]
    async fn list_sections(&self, params: Parameters<ListSectionsParams>) -> Result<CallToolResult, McpError> {
        list_sections_impl(&self.service, params.0).await
    }

    #[tool(description = "Content quality statistics over the recent retrieval window, including SLA status.")]
    async fn quality_stats(&self) -> Result<CallToolResult, McpError> {
        quality_stats_impl(&self.service).await
    }

    #[tool(description = "Cache occupancy (fresh, stale, backup entries). Optionally purge expired entries first.")]
    async fn cache_stats(&self, params: Parameters<CacheStatsParams>) -> Result<CallToolResult, McpError> {
        cache_stats_impl(&self.service, params.0).await
    }
}

impl ServerHandler for DocshelfServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "docshelf".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[test]
    fn test_tool_router_lists_all_tools() {
        let (service, _seed) = testing::service();
        let server = DocshelfServer::new(Arc::new(service));

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["cache_stats", "fetch_content", "get_resource", "list_sections", "quality_stats", "search_docs"]
        );
    }

    #[test]
    fn test_server_info() {
        let (service, _seed) = testing::service();
        let info = DocshelfServer::new(Arc::new(service)).get_info();
        assert_eq!(info.server_info.name, "docshelf");
        assert!(info.capabilities.tools.is_some());
    }
}
