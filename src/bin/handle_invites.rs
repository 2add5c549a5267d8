//! handle-invites — accept private league join requests from players who
//! signed up and were sorted into a team.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use bpl_tools::api::{BplClient, PoeClient};
use bpl_tools::config::{AppConfig, CONFIG_PATH};
use bpl_tools::invites::handle_invites;
use bpl_tools::league::resolve_private_league_id;
use bpl_tools::poller::{self, run_poll_loop};

#[derive(Parser)]
#[command(name = "handle-invites", about = "Auto-accept private league invites for sorted BPL players")]
struct Args {
    /// Process join requests once and exit
    #[arg(long)]
    once: bool,

    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Seconds between checks (overrides config and POLL_INTERVAL_SECS)
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Private league id (overrides config and PRIVATE_LEAGUE_ID)
    #[arg(long)]
    league_id: Option<String>,
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
    let league = BplClient::new(
        config.league.base_url.clone(),
        Some(config.require_bpl_token()?.to_string()),
    );
    let members = PoeClient::new(config.require_poesessid()?);

    let configured_id = args
        .league_id
        .as_deref()
        .or(config.league.private_league_id.as_deref());
    let league_id = resolve_private_league_id(&league, configured_id).await?;

    if args.once {
        handle_invites(&league, &members, &league_id).await?;
        return Ok(());
    }

    let interval = args
        .interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());
    info!("Handling join requests for private league {league_id}");

    let (league, members, league_id) = (&league, &members, league_id.as_str());
    run_poll_loop(
        interval,
        "Checking for guild invites...",
        poller::ctrl_c(),
        move || async move { handle_invites(league, members, league_id).await.map(drop) },
    )
    .await
}
