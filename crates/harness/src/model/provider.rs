//! Connection presets for OpenAI-compatible providers.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Ollama ignores the key but OpenAI-compatible clients send one.
pub(crate) const OLLAMA_API_KEY: &str = "ollama";

/// Base URL and credential of a completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderOptions {
    pub base_url: String,
    pub api_key: Option<String>,
}

/// Known providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Gemini,
    Ollama,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai/",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("MDB_OPEN_AI_API_KEY"),
            Self::Gemini => Some("MDB_GEMINI_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Resolve connection options from the environment.
    pub fn options(self) -> Result<ProviderOptions> {
        let api_key = match self.api_key_env() {
            Some(var) => std::env::var(var)
                .map_err(|_| Error::Config(format!("{var} not set")))?,
            None => OLLAMA_API_KEY.to_string(),
        };
        Ok(ProviderOptions {
            base_url: self.default_base_url().to_string(),
            api_key: Some(api_key),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("unknown provider: {other}"))),
        }
    }
}
