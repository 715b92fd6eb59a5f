//! MCP error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport not started")]
    NotStarted,

    #[error("transport already started")]
    AlreadyStarted,

    #[error("transport closed")]
    Closed,

    #[error("timeout waiting for the server")]
    Timeout,

    /// The `initialize` handshake did not complete.
    #[error("initialize failed: {0}")]
    Initialize(String),

    #[error("MCP request failed: {0}")]
    Service(#[from] rmcp::service::ServiceError),
}

pub type Result<T> = std::result::Result<T, Error>;
