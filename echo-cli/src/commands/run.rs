//! Run the bot until interrupted.

use anyhow::{Context, Result};
use echo_client::{spawn_echo_task, DryRun, EchoBot, Platform, TwitterClient};
use std::sync::Arc;

use super::Clients;
use crate::config::EchoConfig;

/// Run the run command.
///
/// Initialization failure is fatal: nothing is scheduled.
pub async fn run(config: &EchoConfig, dry_run: bool) -> Result<()> {
    let clients = Clients::from_config(config)?;

    if dry_run {
        tracing::info!("Dry run: nothing will be posted");
        serve(config, clients.reader, DryRun::new(clients.writer)).await
    } else {
        serve(config, clients.reader, clients.writer).await
    }
}

async fn serve<W: Platform + 'static>(
    config: &EchoConfig,
    reader: TwitterClient,
    writer: W,
) -> Result<()> {
    let bot = Arc::new(EchoBot::new(
        config.bot_config(),
        reader.clone(),
        writer,
        reader,
    ));

    let watermark = bot
        .initialize()
        .await
        .context("Failed to read destination timeline")?;

    tracing::info!(
        source = %config.bot_config().source,
        %watermark,
        interval_ms = config.schedule.interval_ms,
        "echo-bot running"
    );

    let task = spawn_echo_task(Arc::clone(&bot), config.interval());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down");
    task.abort();

    Ok(())
}
