mod config;
mod error;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use harness::{
    AccuracyTestClient, Model, Scenario, ScenarioReport, TestMcpClient, discover_from_process,
    discover_in_memory,
};
use mcp::{StaticCatalog, Tool, implementation};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use config::{Config, ToolSource};
use error::{Error, Result};

const CONFIG_FILE: &str = "accuracy.toml";
const CATALOG_SERVER: &str = "static-catalog";

#[derive(Parser)]
#[command(name = "accuracy")]
#[command(about = "Measure how accurately models call MCP tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level, overriding RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scenario against every model
    Run {
        /// Only run the model with this name
        #[arg(short, long)]
        model: Option<String>,
        /// Only run the scenario with this name
        #[arg(short, long)]
        scenario: Option<String>,
    },
    /// Discover and print the tool catalog
    Tools,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;

    match cli.command {
        Some(Commands::Run { model, scenario }) => {
            cmd_run(&config, model.as_deref(), scenario.as_deref()).await
        }
        None => cmd_run(&config, None, None).await,
        Some(Commands::Tools) => cmd_tools(&config).await,
    }
}

async fn discover(config: &Config) -> Result<Vec<Tool>> {
    match config.tool_source()? {
        ToolSource::Catalog(path) => {
            let tools = load_catalog(path)?;
            let server = implementation(CATALOG_SERVER, env!("CARGO_PKG_VERSION"));
            Ok(discover_in_memory(StaticCatalog::new(server, tools)).await?)
        }
        ToolSource::Server(server) => Ok(discover_from_process(server).await?),
    }
}

/// Read a JSON array of tool descriptors (`name`, `description`,
/// `inputSchema`).
fn load_catalog(path: &Path) -> Result<Vec<Tool>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn cmd_tools(config: &Config) -> Result<()> {
    let tools = discover(config).await?;

    println!("{} tools", tools.len());
    for tool in &tools {
        println!("  {}", tool.name);
        if let Some(description) = &tool.description {
            println!("      {description}");
        }
    }
    Ok(())
}

async fn cmd_run(
    config: &Config,
    model_filter: Option<&str>,
    scenario_filter: Option<&str>,
) -> Result<()> {
    let models: Vec<_> = config
        .models
        .iter()
        .filter(|m| model_filter.is_none_or(|name| m.model == name))
        .collect();
    if let Some(name) = model_filter {
        if models.is_empty() {
            return Err(Error::NoMatch {
                kind: "model",
                name: name.to_string(),
            });
        }
    }

    let scenarios: Vec<_> = config
        .scenarios()
        .into_iter()
        .filter(|s| scenario_filter.is_none_or(|name| s.name == name))
        .collect();
    if let Some(name) = scenario_filter {
        if scenarios.is_empty() {
            return Err(Error::NoMatch {
                kind: "scenario",
                name: name.to_string(),
            });
        }
    }

    let client = AccuracyTestClient::new(discover(config).await?)?;
    info!(tools = client.list_tools().len(), "catalog ready");

    let mut reports = Vec::new();
    for model_config in models {
        let model = model_config.build()?;
        for scenario in &scenarios {
            let report = run_scenario(scenario, &model, &client).await;
            print_report(&report);
            reports.push(report);
        }
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    println!("\n{} passed, {failed} failed", reports.len() - failed);
    if failed > 0 {
        return Err(Error::ScenariosFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}

/// Run one scenario. A run that errors out counts as a failure so the rest
/// of the suite still runs.
async fn run_scenario<M: Model>(
    scenario: &Scenario,
    model: &M,
    client: &AccuracyTestClient,
) -> ScenarioReport {
    match scenario.run(model, client).await {
        Ok(report) => report,
        Err(e) => {
            warn!(scenario = %scenario.name, model = %model, "scenario errored: {e}");
            ScenarioReport::errored(&scenario.name, model, &e)
        }
    }
}

fn print_report(report: &ScenarioReport) {
    let status = if report.passed() { "PASS" } else { "FAIL" };
    println!("[{status}] {} :: {}", report.model, report.scenario);
    for failure in &report.failures {
        println!("    {failure}");
    }
}
