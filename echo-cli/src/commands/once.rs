//! Run a single sync cycle.

use anyhow::{Context, Result};
use echo_client::{CycleReport, DryRun, EchoBot, Outcome, Platform, TwitterClient};

use super::Clients;
use crate::config::EchoConfig;

/// Run the once command.
pub async fn run(config: &EchoConfig, dry_run: bool) -> Result<()> {
    let clients = Clients::from_config(config)?;

    let report = if dry_run {
        let writer = DryRun::new(clients.writer);
        cycle(config, clients.reader, writer).await?
    } else {
        cycle(config, clients.reader, clients.writer).await?
    };

    print_report(&report);
    Ok(())
}

async fn cycle<W: Platform>(
    config: &EchoConfig,
    reader: TwitterClient,
    writer: W,
) -> Result<CycleReport> {
    let bot = EchoBot::new(config.bot_config(), reader.clone(), writer, reader);

    bot.initialize()
        .await
        .context("Failed to read destination timeline")?;

    bot.run_cycle().await.context("Sync cycle failed")
}

fn print_report(report: &CycleReport) {
    println!("=== echo-bot cycle ===");
    println!();
    println!("Fetched:    {}", report.fetched);
    println!("New:        {}", report.considered);
    println!("Echoed:     {}", report.echoed());
    println!("Reposted:   {}", report.reposted());
    println!("Skipped:    {}", report.skipped());
    println!("Failed:     {}", report.failed());
    println!("Watermark:  {}", report.watermark_after);

    if !report.outcomes.is_empty() {
        println!();
        for item in &report.outcomes {
            let detail = match &item.outcome {
                Outcome::Echoed(id) => format!("echoed as {}", id),
                Outcome::Reposted(id) => format!("reposted as {}", id),
                Outcome::Skipped(reason) => format!("skipped: {}", reason),
                Outcome::Failed(e) => format!("failed: {}", e),
            };
            println!("  {} [{}] {}", item.source_id, item.action, detail);
        }
    }
}
