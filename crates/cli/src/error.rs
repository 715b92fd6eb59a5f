//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or missing required fields.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A `--model` or `--scenario` filter matched nothing.
    #[error("no {kind} named '{name}' in config")]
    NoMatch { kind: &'static str, name: String },

    /// At least one scenario ran to completion but missed its expectations.
    #[error("{failed} of {total} scenario runs failed")]
    ScenariosFailed { failed: usize, total: usize },

    /// An error occurred in the harness.
    #[error(transparent)]
    Harness(#[from] harness::Error),

    /// The tool catalog file is not a JSON list of tools.
    #[error("invalid tool catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
