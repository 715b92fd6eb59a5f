//! Tool discovery against a real MCP server.
//!
//! Discovery runs once per catalog. The resulting tools feed an
//! [`AccuracyTestClient`](crate::AccuracyTestClient); the server itself is
//! never called during a test.

use mcp::{
    Client, ClientTransport, Implementation, ServerConfig, ServerHandler, Tool, duplex,
    implementation, spawn_session,
};
use tracing::{debug, warn};

use crate::Result;

/// Name the harness announces when it connects to a server.
pub const DISCOVERY_CLIENT: &str = "accuracy-tool-discovery-client";

fn client_info() -> Implementation {
    implementation(DISCOVERY_CLIENT, env!("CARGO_PKG_VERSION"))
}

async fn list_and_close(client: Client) -> Result<Vec<Tool>> {
    let server = client
        .server_info()
        .map(|info| info.server_info.name.clone())
        .unwrap_or_default();
    let tools = client.list_tools().await;
    client.shutdown().await;

    let tools = tools?;
    debug!(server = %server, tools = tools.len(), "tools discovered");
    Ok(tools)
}

/// Handshake over the client end of an in-memory duplex and list the
/// server's tools.
///
/// The transport must already be started.
pub async fn discover_tools(transport: ClientTransport) -> Result<Vec<Tool>> {
    let client = Client::connect(transport, client_info()).await?;
    list_and_close(client).await
}

/// Discover tools from an in-process server over a linked transport pair.
pub async fn discover_in_memory<S: ServerHandler>(server: S) -> Result<Vec<Tool>> {
    let (mut client_end, mut server_end) = duplex();
    client_end.start()?;
    server_end.start()?;

    let session = spawn_session(server, server_end);
    let tools = discover_tools(client_end).await;
    if let Err(e) = session.await {
        warn!("in-memory server task did not finish cleanly: {e}");
    }
    tools
}

/// Spawn a server process, discover its tools, and shut it down.
pub async fn discover_from_process(config: ServerConfig) -> Result<Vec<Tool>> {
    let client = Client::spawn(&config, client_info()).await?;
    list_and_close(client).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp::{StaticCatalog, input_schema, tool};
    use serde_json::json;

    fn catalog() -> Vec<Tool> {
        vec![
            tool("list-databases", "List all databases", json!({"type": "object"})),
            tool(
                "find",
                "Run a find query",
                json!({"type": "object", "properties": {"collection": {"type": "string"}}}),
            ),
        ]
    }

    #[tokio::test]
    async fn in_memory_discovery_preserves_order_and_schemas() {
        let server = StaticCatalog::new(implementation("mock-server", "1.0.0"), catalog());
        let tools = discover_in_memory(server).await.unwrap();

        let names: Vec<_> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names, vec!["list-databases", "find"]);
        assert_eq!(input_schema(&tools[1]), input_schema(&catalog()[1]));
        assert_eq!(tools[0].description.as_deref(), Some("List all databases"));
    }

    #[tokio::test]
    async fn unstarted_transport_fails_discovery() {
        let (client_end, mut server_end) = duplex();
        server_end.start().unwrap();
        let err = discover_tools(client_end).await.unwrap_err();
        assert!(matches!(err, crate::Error::Mcp(mcp::Error::Initialize(_))));
    }

    #[tokio::test]
    async fn missing_server_binary_is_an_error() {
        let config = ServerConfig {
            name: "missing".into(),
            command: "definitely-not-an-mcp-server".into(),
            args: vec![],
            env: Default::default(),
        };
        let err = discover_from_process(config).await.unwrap_err();
        assert!(matches!(err, crate::Error::Mcp(mcp::Error::Io(_))));
    }
}
