//! setup-account — first-time setup for the BPL tools.
//!
//! Reads the BPL token and the PoE session id, checks both against the live
//! APIs, and stores them in the config file (created if missing).
//!
//! By default, reads credentials interactively (hidden input) to avoid
//! leaking them into shell history. Use the flags only for scripted use.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use bpl_tools::api::{BplClient, LeagueApi, MemberApi, PoeClient};
use bpl_tools::config::{AppConfig, CONFIG_PATH};
use bpl_tools::invites::{signed_up_accounts, split_members};
use bpl_tools::league::resolve_private_league_id;

const BPL_TOKEN_HELP: &str = "\
How to get your BPL token:
  1. Log in at https://bpl-poe.com/
  2. Open dev tools (F12) > Application / Storage > Local storage
  3. Copy the value stored under 'auth'";

const POESESSID_HELP: &str = "\
How to get your PoE session id (EXTREMELY sensitive, it logs in as you):
  1. Log in at https://www.pathofexile.com/
  2. Open dev tools (F12) > Application / Storage > Cookies
  3. Copy the value of the POESESSID cookie";

#[derive(Parser)]
#[command(
    name = "setup-account",
    about = "Validate BPL and PoE credentials and save them to the config file"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// BPL API token. If omitted, reads interactively with hidden input.
    #[arg(long)]
    bpl_token: Option<String>,

    /// POESESSID cookie value. If omitted, reads interactively with hidden input.
    #[arg(long)]
    poesessid: Option<String>,

    /// Save credentials without checking them against the APIs
    #[arg(long)]
    skip_validation: bool,
}

fn read_secret(flag: Option<String>, prompt: &str, help: &str) -> Result<String> {
    let value = match flag {
        Some(value) => value,
        None => {
            println!("{help}\n");
            rpassword::prompt_password(prompt).with_context(|| format!("failed to read {prompt}"))?
        }
    };
    let value = value.trim().to_string();
    if value.is_empty() {
        bail!("value cannot be empty");
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_path();

    // Only file values are written back; env overrides are used for the checks.
    dotenvy::dotenv().ok();
    let mut app_config = AppConfig::load_or_default(config_path)?;
    let effective = app_config.with_env(|key| std::env::var(key).ok());
    effective.validate()?;

    println!("=== BPL Tools — Account Setup ===\n");

    // ── Step 1: Read credentials ───────────────────────────────────
    let bpl_token = read_secret(cli.bpl_token, "Enter BPL token: ", BPL_TOKEN_HELP)?;
    let poesessid = read_secret(cli.poesessid, "Enter POESESSID: ", POESESSID_HELP)?;
    println!();

    if !cli.skip_validation {
        // ── Step 2: Validate BPL token ─────────────────────────────
        println!("Checking BPL token against {}...", effective.league.base_url);
        let league = BplClient::new(effective.league.base_url.clone(), Some(bpl_token.clone()));
        let signups = league
            .signups()
            .await
            .context("BPL token check failed")?;
        println!(
            "  {} signups, {} sorted into a team",
            signups.len(),
            signed_up_accounts(&signups).len()
        );
        println!();

        // ── Step 3: Validate PoE session ───────────────────────────
        println!("Checking PoE session against the private league...");
        let league_id =
            resolve_private_league_id(&league, effective.league.private_league_id.as_deref())
                .await?;
        let members = PoeClient::new(poesessid.clone())
            .members(&league_id)
            .await
            .context("PoE session check failed")?;
        let (requests, accepted) = split_members(members);
        println!(
            "  League PL{league_id}: {} members, {} pending requests",
            accepted.len(),
            requests.len()
        );
        println!();
    }

    // ── Step 4: Save credentials ───────────────────────────────────
    println!("Saving credentials to {}...", config_path.display());
    app_config.account.bpl_token = Some(bpl_token);
    app_config.account.poesessid = Some(poesessid);
    app_config.save(config_path)?;
    println!("  Config updated successfully");
    println!();

    println!("=== Setup Complete ===");
    println!();
    println!("Next steps:");
    println!("  cargo run --bin check-names");
    println!("  cargo run --bin handle-invites -- --once");

    Ok(())
}
