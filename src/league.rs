use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::api::LeagueApi;
use crate::error::ApiError;

static PRIVATE_LEAGUE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\(PL(\d+)\)").expect("private league id pattern is valid")
});

/// Extract the numeric private league id from an event name like `"BPL 7 (PL12345)"`.
pub fn parse_private_league_id(event_name: &str) -> Result<String, ApiError> {
    PRIVATE_LEAGUE_ID
        .captures(event_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ApiError::LeagueIdNotFound(event_name.to_string()))
}

/// Use the configured private league id, or look it up from the current event.
pub async fn resolve_private_league_id(
    league: &dyn LeagueApi,
    configured: Option<&str>,
) -> Result<String> {
    if let Some(id) = configured {
        return Ok(id.to_string());
    }
    let event = league
        .current_event()
        .await
        .context("failed to fetch current event")?;
    let id = parse_private_league_id(&event.name)?;
    info!("Checking requests for league {}", event.name);
    Ok(id)
}
