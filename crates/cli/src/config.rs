//! Configuration loading from accuracy.toml.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use harness::{OpenAiCompatibleModel, Provider, ProviderOptions, Scenario};
use mcp::ServerConfig;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// System prompt for scenarios that do not set their own.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Static tool catalog served in-process.
    /// Mutually exclusive with server.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,

    /// MCP server launched for discovery.
    /// Mutually exclusive with catalog.
    #[serde(default)]
    pub server: Option<ServerSection>,

    #[serde(default)]
    pub models: Vec<ModelConfig>,

    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// JSON file holding a list of tool descriptors.
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// One model under test.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// "openai", "gemini", "ollama" or "custom".
    pub provider: String,

    pub model: String,

    /// Overrides the provider's endpoint. Required for "custom".
    pub base_url: Option<String>,

    /// Overrides the key read from the provider's environment variable.
    pub api_key: Option<String>,
}

/// Where the tool catalog comes from.
#[derive(Debug)]
pub enum ToolSource<'a> {
    Catalog(&'a Path),
    Server(ServerConfig),
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Requires exactly one of catalog or server to be set.
    pub fn tool_source(&self) -> Result<ToolSource<'_>, ConfigError> {
        match (&self.catalog, &self.server) {
            (Some(catalog), None) => Ok(ToolSource::Catalog(&catalog.path)),
            (None, Some(server)) => Ok(ToolSource::Server(ServerConfig {
                name: server.command.clone(),
                command: server.command.clone(),
                args: server.args.clone(),
                env: server.env.clone(),
            })),
            (Some(_), Some(_)) => Err(ConfigError::AmbiguousTools),
            (None, None) => Err(ConfigError::MissingTools),
        }
    }

    /// Scenarios with the top-level system prompt filled in.
    pub fn scenarios(&self) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .cloned()
            .map(|mut scenario| {
                if scenario.system_prompt.is_none() {
                    scenario.system_prompt = self.system_prompt.clone();
                }
                scenario
            })
            .collect()
    }
}

impl ModelConfig {
    /// Resolve endpoint options. Provider keys come from the environment
    /// unless `api_key` is set.
    pub fn options(&self) -> Result<ProviderOptions, ConfigError> {
        if self.provider.eq_ignore_ascii_case("custom") {
            let base_url = self
                .base_url
                .clone()
                .ok_or_else(|| ConfigError::MissingBaseUrl(self.model.clone()))?;
            return Ok(ProviderOptions {
                base_url,
                api_key: self.api_key.clone(),
            });
        }

        let provider: Provider = self.provider.parse()?;
        let mut options = match &self.api_key {
            Some(key) => ProviderOptions {
                base_url: provider.default_base_url().to_string(),
                api_key: Some(key.clone()),
            },
            None => provider.options()?,
        };
        if let Some(base_url) = &self.base_url {
            options.base_url = base_url.clone();
        }
        Ok(options)
    }

    pub fn build(&self) -> Result<OpenAiCompatibleModel, ConfigError> {
        Ok(OpenAiCompatibleModel::new(&self.model, self.options()?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("tools not configured: set catalog.path or server.command")]
    MissingTools,

    #[error("ambiguous tools: set either catalog.path OR server.command, not both")]
    AmbiguousTools,

    #[error("model '{0}' uses the custom provider but has no base_url")]
    MissingBaseUrl(String),

    #[error(transparent)]
    Provider(#[from] harness::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        system_prompt = "Use tools."

        [catalog]
        path = "tools.json"

        [[models]]
        provider = "ollama"
        model = "llama3.1"

        [[models]]
        provider = "custom"
        model = "local"
        base_url = "http://127.0.0.1:8080/v1"

        [[scenarios]]
        name = "find users"
        prompt = "find all users in collection users"

        [[scenarios]]
        name = "own prompt"
        prompt = "list databases"
        system_prompt = "Be terse."
    "#;

    #[test]
    fn parses_full_config() {
        let config = Config::parse(CONFIG).unwrap();
        assert_eq!(config.models.len(), 2);
        assert!(matches!(
            config.tool_source().unwrap(),
            ToolSource::Catalog(path) if path == Path::new("tools.json")
        ));
    }

    #[test]
    fn top_level_prompt_fills_scenarios_without_one() {
        let config = Config::parse(CONFIG).unwrap();
        let prompts: Vec<_> = config
            .scenarios()
            .into_iter()
            .map(|s| s.system_prompt)
            .collect();
        assert_eq!(
            prompts,
            vec![Some("Use tools.".to_string()), Some("Be terse.".to_string())]
        );
    }

    #[test]
    fn tool_source_must_be_unique() {
        let both = Config::parse(
            r#"
            [catalog]
            path = "tools.json"
            [server]
            command = "npx"
            "#,
        )
        .unwrap();
        assert!(matches!(both.tool_source(), Err(ConfigError::AmbiguousTools)));

        let neither = Config::parse("").unwrap();
        assert!(matches!(neither.tool_source(), Err(ConfigError::MissingTools)));
    }

    #[test]
    fn server_section_becomes_server_config() {
        let config = Config::parse(
            r#"
            [server]
            command = "npx"
            args = ["-y", "mongodb-mcp-server"]
            env = { MDB_MCP_READ_ONLY = "true" }
            "#,
        )
        .unwrap();
        let ToolSource::Server(server) = config.tool_source().unwrap() else {
            panic!("expected server source");
        };
        assert_eq!(server.command, "npx");
        assert_eq!(server.args, vec!["-y", "mongodb-mcp-server"]);
        assert_eq!(server.env["MDB_MCP_READ_ONLY"], "true");
    }

    #[test]
    fn model_options_resolve() {
        let config = Config::parse(CONFIG).unwrap();

        let ollama = config.models[0].options().unwrap();
        assert_eq!(ollama.base_url, "http://localhost:11434/v1");
        assert_eq!(ollama.api_key.as_deref(), Some("ollama"));

        let custom = config.models[1].options().unwrap();
        assert_eq!(custom.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(custom.api_key, None);
    }

    #[test]
    fn explicit_key_skips_environment() {
        let model = ModelConfig {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            base_url: None,
            api_key: Some("sk-test".into()),
        };
        let options = model.options().unwrap();
        assert_eq!(options.base_url, "https://api.openai.com/v1");
        assert_eq!(options.api_key.as_deref(), Some("sk-test"));
        assert_eq!(model.build().unwrap().to_string(), "OAI Compatible: gpt-4o-mini");
    }

    #[test]
    fn custom_without_base_url_is_rejected() {
        let model = ModelConfig {
            provider: "custom".into(),
            model: "local".into(),
            base_url: None,
            api_key: None,
        };
        assert!(matches!(model.options(), Err(ConfigError::MissingBaseUrl(name)) if name == "local"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let model = ModelConfig {
            provider: "anthropic".into(),
            model: "claude".into(),
            base_url: None,
            api_key: None,
        };
        assert!(matches!(model.options(), Err(ConfigError::Provider(_))));
    }
}
