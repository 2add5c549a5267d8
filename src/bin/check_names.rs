//! check-names — report ladder characters whose name lacks their team's tag
//! or whose ascendancy the team may not play.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use bpl_tools::api::BplClient;
use bpl_tools::config::{AppConfig, CONFIG_PATH};
use bpl_tools::names::check_names;
use bpl_tools::poller::{self, run_poll_loop};

#[derive(Parser)]
#[command(name = "check-names", about = "Check BPL ladder character names against teams")]
struct Args {
    /// Run a single check and exit
    #[arg(long)]
    once: bool,

    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Seconds between checks (overrides config and POLL_INTERVAL_SECS)
    #[arg(long)]
    interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.interval_secs == Some(0) {
        anyhow::bail!("--interval-secs must be positive");
    }

    let config = AppConfig::resolve(&args.config)?;
    let team_shorts = config.team_shorts()?;
    let min_level = config.settings.min_level;
    let client = BplClient::new(
        config.league.base_url.clone(),
        config.bpl_token().map(str::to_string),
    );

    if args.once {
        check_names(&client, &team_shorts, min_level).await?;
        return Ok(());
    }

    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());
    info!(
        "Starting player name checks against {} (min level {min_level})",
        client.base_url()
    );

    let (client, team_shorts) = (&client, &team_shorts);
    run_poll_loop(
        interval,
        "Checking for player name mismatches...",
        poller::ctrl_c(),
        move || async move { check_names(client, team_shorts, min_level).await.map(drop) },
    )
    .await
}
