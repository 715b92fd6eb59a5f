//! MCP client session for tool discovery.

use std::collections::HashMap;
use std::time::Duration;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, ClientInfo, Implementation, JsonObject, ServerInfo,
    Tool,
};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::{ConfigureCommandExt, IntoTransport, TokioChildProcess};
use rmcp::{ClientHandler, ServiceExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default timeout for MCP operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration for an MCP server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

/// Announces the client's identity during `initialize`.
#[derive(Debug, Clone)]
struct Identity(Implementation);

impl ClientHandler for Identity {
    fn get_info(&self) -> ClientInfo {
        let mut info = ClientInfo::default();
        info.client_info = self.0.clone();
        info
    }
}

/// An initialized MCP client session.
pub struct Client {
    service: RunningService<RoleClient, Identity>,
    request_timeout: Duration,
}

impl Client {
    /// Connect over `transport` and complete the initialize handshake.
    pub async fn connect<T, E, A>(transport: T, client_info: Implementation) -> Result<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::connect_with_timeout(transport, client_info, DEFAULT_TIMEOUT).await
    }

    /// Like [`Client::connect`], with a custom per-request timeout.
    pub async fn connect_with_timeout<T, E, A>(
        transport: T,
        client_info: Implementation,
        request_timeout: Duration,
    ) -> Result<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = timeout(request_timeout, Identity(client_info).serve(transport))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|e| Error::Initialize(e.to_string()))?;

        if let Some(info) = service.peer_info() {
            debug!(
                server = %info.server_info.name,
                protocol = ?info.protocol_version,
                "client initialized"
            );
        }
        Ok(Self {
            service,
            request_timeout,
        })
    }

    /// Spawn a server process and connect to its stdio.
    pub async fn spawn(config: &ServerConfig, client_info: Implementation) -> Result<Self> {
        let transport = TokioChildProcess::new(Command::new(&config.command).configure(|cmd| {
            cmd.args(&config.args).envs(&config.env);
        }))?;
        debug!(server = %config.name, command = %config.command, "spawned server process");

        Self::connect(transport, client_info).await
    }

    /// Server info returned by the initialize handshake.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.service.peer_info()
    }

    /// List the tools the server exposes, in the order it reports them.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let response = timeout(
            self.request_timeout,
            self.service.list_tools(Default::default()),
        )
        .await
        .map_err(|_| Error::Timeout)??;
        Ok(response.tools)
    }

    /// Call a tool by name.
    ///
    /// An error-flagged result is returned as-is; it is not turned into an
    /// `Err`.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };
        let result = timeout(self.request_timeout, self.service.call_tool(params))
            .await
            .map_err(|_| Error::Timeout)??;
        Ok(result)
    }

    /// End the session. A spawned server process is killed with it.
    pub async fn shutdown(self) {
        if let Err(e) = self.service.cancel().await {
            warn!("client session did not shut down cleanly: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::duplex;

    fn client_info() -> Implementation {
        crate::implementation("test-client", "0.0.0")
    }

    #[tokio::test]
    async fn closed_peer_fails_initialize() {
        let (mut ours, theirs) = duplex();
        ours.start().unwrap();
        drop(theirs);

        let result = Client::connect(ours, client_info()).await;
        assert!(matches!(result, Err(Error::Initialize(_))));
    }

    #[tokio::test]
    async fn unstarted_transport_fails_initialize() {
        let (ours, mut theirs) = duplex();
        theirs.start().unwrap();

        let result = Client::connect(ours, client_info()).await;
        assert!(matches!(result, Err(Error::Initialize(_))));
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (mut ours, mut theirs) = duplex();
        ours.start().unwrap();
        theirs.start().unwrap();

        let result =
            Client::connect_with_timeout(ours, client_info(), Duration::from_millis(20)).await;
        assert!(matches!(result, Err(Error::Timeout)));
        drop(theirs);
    }

    #[tokio::test]
    async fn missing_server_binary_is_an_io_error() {
        let config = ServerConfig {
            name: "missing".into(),
            command: "definitely-not-an-mcp-server".into(),
            args: vec![],
            env: HashMap::new(),
        };
        let result = Client::spawn(&config, client_info()).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
