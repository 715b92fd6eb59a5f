//! Server side of an MCP session.
//!
//! [`StaticCatalog`] is an rmcp [`ServerHandler`] that advertises a fixed
//! list of tools. It is enough to stand up a live session for discovery;
//! rmcp answers `initialize`, `ping`, and unknown methods.

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData, ServerHandler, ServiceExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::ServerTransport;

/// Serve `handler` on a background task until the client goes away.
pub fn spawn_session<S: ServerHandler>(handler: S, transport: ServerTransport) -> JoinHandle<()> {
    tokio::spawn(async move {
        let session = match handler.serve(transport).await {
            Ok(session) => session,
            Err(e) => {
                warn!("server session failed to initialize: {e}");
                return;
            }
        };
        match session.waiting().await {
            Ok(reason) => debug!(?reason, "server session ended"),
            Err(e) => warn!("server session task failed: {e}"),
        }
    })
}

/// A fixed list of tool descriptors with no implementations behind them.
///
/// Calling a listed tool yields an error-flagged result; calling anything
/// else is an invalid-params error.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    info: Implementation,
    tools: Vec<Tool>,
}

impl StaticCatalog {
    pub fn new(info: Implementation, tools: Vec<Tool>) -> Self {
        Self { info, tools }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }
}

impl ServerHandler for StaticCatalog {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: self.info.clone(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        debug!(server = %self.info.name, tools = self.tools.len(), "tools/list");
        let mut result = ListToolsResult::default();
        result.tools = self.tools.clone();
        Ok(result)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(server = %self.info.name, tool = %request.name, "tools/call");
        if self.tools.iter().any(|tool| tool.name == request.name) {
            Ok(CallToolResult::error(vec![Content::text(format!(
                "tool {} is listed for discovery only",
                request.name
            ))]))
        } else {
            Err(ErrorData::invalid_params(
                format!("unknown tool: {}", request.name),
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;

    use crate::Error;
    use crate::client::Client;
    use crate::tool::{ToolResultExt, implementation, tool};
    use crate::transport::duplex;

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(
            implementation("test-server", "1.0.0"),
            vec![
                tool("find", "Run a find query", json!({"type": "object"})),
                tool("count", "Count documents", json!({"type": "object"})),
            ],
        )
    }

    async fn connect(catalog: StaticCatalog) -> Client {
        let (mut client_end, mut server_end) = duplex();
        client_end.start().unwrap();
        server_end.start().unwrap();
        spawn_session(catalog, server_end);
        Client::connect(client_end, implementation("c", "0")).await.unwrap()
    }

    #[tokio::test]
    async fn lists_tools_in_catalog_order() {
        let client = connect(catalog()).await;

        let info = client.server_info().unwrap();
        assert_eq!(info.server_info.name, "test-server");
        assert!(info.capabilities.tools.is_some());

        let names: Vec<String> = client
            .list_tools()
            .await
            .unwrap()
            .iter()
            .map(|tool| tool.name.to_string())
            .collect();
        assert_eq!(names, vec!["find", "count"]);
    }

    #[tokio::test]
    async fn call_on_listed_tool_is_error_flagged() {
        let client = connect(catalog()).await;

        let result = client.call_tool("find", None).await.unwrap();
        assert!(result.is_error_result());
        assert_eq!(
            result.texts().collect::<Vec<_>>(),
            vec!["tool find is listed for discovery only"]
        );
    }

    #[tokio::test]
    async fn bad_requests_get_an_error_reply() {
        let client = connect(catalog()).await;

        let reply = tokio::time::timeout(
            Duration::from_secs(1),
            client.call_tool("drop-database", None),
        )
        .await
        .expect("the server answers instead of dropping the request");
        assert!(matches!(reply, Err(Error::Service(_))));

        // The session survives the failed request.
        assert_eq!(client.list_tools().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn session_ends_when_client_goes_away() {
        let (mut client_end, mut server_end) = duplex();
        client_end.start().unwrap();
        server_end.start().unwrap();
        let server = spawn_session(catalog(), server_end);

        let client = Client::connect(client_end, implementation("c", "0")).await.unwrap();
        client.shutdown().await;

        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .expect("session stops once the client is gone")
            .unwrap();
    }

    #[tokio::test]
    async fn session_without_a_client_gives_up() {
        let (client_end, mut server_end) = duplex();
        server_end.start().unwrap();
        let server = spawn_session(catalog(), server_end);

        drop(client_end);
        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .expect("initialize fails once the client end is dropped")
            .unwrap();
    }
}
