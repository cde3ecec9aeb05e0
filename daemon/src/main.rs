//! tcr: replay token-curated registry scenarios from the command line.

mod config;
mod scenario;

use clap::Parser;
use config::TcrConfig;
use scenario::Scenario;
use std::path::PathBuf;
use tcr_utils::LogFormat;

#[derive(Parser)]
#[command(name = "tcr", about = "Token-curated registry simulator")]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when absent;
    /// CLI flags and env vars override file settings.
    #[arg(long, env = "TCR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TCR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, env = "TCR_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a scenario file and print one JSON line per step.
    Run {
        /// TOML file listing `[[step]]` entries.
        #[arg(long)]
        scenario: PathBuf,
    },
    /// Print the effective configuration as TOML.
    #[command(name = "show-config")]
    ShowConfig,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = match cli.config {
        Some(ref path) => TcrConfig::from_toml_file(path)?,
        None => TcrConfig::default(),
    };
    let config = TcrConfig {
        log_level: cli.log_level.unwrap_or(file_config.log_level.clone()),
        log_format: cli.log_format.unwrap_or(file_config.log_format),
        ..file_config
    };

    tcr_utils::init_logging(config.log_format, &config.log_level);
    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Run { scenario } => {
            let scenario = Scenario::from_toml_file(&scenario)?;
            let summary = scenario::run(&config, &scenario, |report| {
                match serde_json::to_string(report) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!("failed to encode step {}: {e}", report.step),
                }
            })?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
