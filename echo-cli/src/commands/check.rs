//! Validate configuration.

use anyhow::Result;

use crate::config::EchoConfig;

/// Run the check command.
///
/// Loading already validated the configuration; this only reports it.
pub fn run(config: &EchoConfig) -> Result<()> {
    println!("=== echo-bot configuration ===");
    println!();
    println!("{}", config.summary());
    println!();
    println!("Configuration OK");
    Ok(())
}
