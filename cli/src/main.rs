//! quorumctl: validate engine configuration and replay approval scenarios.

mod scenario;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use quorum_engine::EngineConfig;
use quorum_utils::LogFormat;
use std::path::PathBuf;

use crate::scenario::Scenario;

#[derive(Parser)]
#[command(name = "quorumctl", about = "Multi-party approval engine tooling")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's `log_level`.
    #[arg(long, global = true, env = "QUORUM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Defaults to the config file's `log_format`.
    #[arg(long, global = true, env = "QUORUM_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to the engine TOML configuration (genesis beneficiaries, logging).
    #[arg(long, env = "QUORUM_CONFIG")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a configuration file and print it back.
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Replay a scenario file against a fresh engine.
    Replay {
        #[command(flatten)]
        config: ConfigArgs,

        /// Scenario TOML with `[[step]]` entries.
        scenario: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    fn config_path(&self) -> &PathBuf {
        match self {
            Self::Check { config } | Self::Replay { config, .. } => &config.config,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.command.config_path();
    let config = EngineConfig::from_toml_file(path)
        .with_context(|| format!("loading config {}", path.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    quorum_utils::init_logging(cli.log_format.unwrap_or(config.log_format), level);
    tracing::info!(
        config = %path.display(),
        beneficiaries = config.beneficiaries.len(),
        "configuration loaded"
    );

    match cli.command {
        Command::Check { .. } => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Replay {
            scenario: scenario_path,
            json,
            ..
        } => {
            let steps = Scenario::from_toml_file(&scenario_path)?;
            let report = scenario::replay(&config, &steps)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
    }

    Ok(())
}
