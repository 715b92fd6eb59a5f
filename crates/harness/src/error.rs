use thiserror::Error;

use crate::llm::ModelError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Dispatch to a tool that was never discovered. This is a harness bug,
    /// not a runtime condition.
    #[error("No tool registered with name {0}")]
    ToolNotFound(String),

    #[error("duplicate tool in catalog: {0}")]
    DuplicateTool(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Mcp(#[from] mcp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
