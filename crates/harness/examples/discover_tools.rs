//! List the tools an MCP server exposes, as the harness sees them.
//!
//! Run with: cargo run --example discover_tools -- <command> [args...]

use std::collections::HashMap;

use harness::{AccuracyTestClient, Model, OpenAiCompatibleModel, discover_from_process};
use mcp::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let command = argv
        .next()
        .ok_or("usage: discover_tools <command> [args...]")?;

    let config = ServerConfig {
        name: command.clone(),
        command,
        args: argv.collect(),
        env: HashMap::new(),
    };

    println!("Spawning MCP server: {} {:?}", config.command, config.args);
    let tools = discover_from_process(config).await?;

    println!("\nDiscovered {} tools:", tools.len());
    for tool in &tools {
        println!("  - {}", tool.name);
        if let Some(desc) = &tool.description {
            println!("    {desc}");
        }
    }

    // Show the function-calling form sent to models.
    let model = OpenAiCompatibleModel::ollama("llama3.1");
    let client = AccuracyTestClient::new(tools)?;
    for tool in harness::TestMcpClient::list_tools(&client) {
        println!("{}", serde_json::to_string_pretty(&model.transform_tool(tool))?);
    }

    Ok(())
}
