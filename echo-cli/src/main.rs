//! # echo-bot
//!
//! Mirrors one account's timeline onto the authenticated account.
//!
//! ## Commands
//!
//! - `run`: Initialize, then sync every interval until Ctrl-C
//! - `once`: Initialize and run a single sync cycle
//! - `check`: Validate configuration without touching the network
//!
//! ## Example
//!
//! ```bash
//! # Validate configuration
//! TWITTER_ACCOUNT_TO_ECHO=someone TWITTER_ACCESS_TOKEN=... echo-bot check
//!
//! # Preview one cycle without posting anything
//! echo-bot --config echo.toml --dry-run once
//!
//! # Run continuously
//! echo-bot --config echo.toml run
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{check, once, run};
use config::EchoConfig;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG_FILE: &str = "echo.toml";

/// Mirror a timeline onto your own account.
#[derive(Parser, Debug)]
#[command(name = "echo-bot")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./echo.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Read timelines but only log what would be posted
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize, then sync every interval until interrupted
    Run,

    /// Initialize and run a single sync cycle
    Once,

    /// Validate configuration and print it with secrets redacted
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run => {
            run::run(&config, cli.dry_run).await?;
        }
        Commands::Once => {
            once::run(&config, cli.dry_run).await?;
        }
        Commands::Check => {
            check::run(&config)?;
        }
    }

    Ok(())
}

/// Install the fmt subscriber; `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{}'", level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load the file (if any), overlay the environment and validate.
fn load_config(path: Option<&Path>) -> Result<EchoConfig> {
    let mut config = match path {
        Some(path) => EchoConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            EchoConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => EchoConfig::default(),
    };

    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate().context("Invalid configuration")?;

    Ok(config)
}
