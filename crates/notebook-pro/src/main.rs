mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use notebook_pro_config::NotebookConfig;

use script::{Script, ScriptRunner};

/// Replays a script of editor events against notebook-pro's document
/// sessions and prints the resulting state as JSON.
#[derive(Parser, Debug)]
#[command(name = "notebook-pro", version, about)]
struct Cli {
    /// Script file: `{"steps": [{"op": "type", "text": "..."}, ...]}`.
    script: PathBuf,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the report.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = cli.config.unwrap_or_else(NotebookConfig::config_path);
    let config = NotebookConfig::load_or_create(&config_path);
    tracing::info!(config = %config_path.display(), "Starting notebook-pro");

    let raw = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("failed to read script: {}", cli.script.display()))?;
    let script: Script = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse script: {}", cli.script.display()))?;

    let report = ScriptRunner::new(config).run(&script)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;
    println!("{json}");

    Ok(())
}
