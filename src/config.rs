use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_BPL_BASE_URL, DEFAULT_POLL_INTERVAL_SECS};

/// Default config file path.
pub const CONFIG_PATH: &str = "bpl-tools.toml";

/// Team short codes used when the config file has no `[teams]` entry for a team.
pub const DEFAULT_TEAM_SHORTS: &[(i64, &str)] = &[(18, "BAS"), (19, "DEA"), (20, "SNI")];

/// Top-level application config deserialized from `bpl-tools.toml`, with
/// environment overrides applied on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub league: LeagueConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Team id -> short code overrides, e.g. `18 = "BAS"`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub teams: BTreeMap<String, String>,
}

/// Pre-issued credentials. Both are sensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Bearer token for the BPL API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpl_token: Option<String>,
    /// `POESESSID` cookie from a logged-in pathofexile.com session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poesessid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Numeric private league id. Discovered from the current event when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_league_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BPL_BASE_URL.to_string()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            private_league_id: None,
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Delay between poll cycles in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Ladder entries below this level are exempt from the team tag check.
    #[serde(default)]
    pub min_level: u32,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            min_level: 0,
        }
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load config from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load `.env`, the config file, and environment overrides, then validate.
    pub fn resolve(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::load_or_default(path)?.with_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Copy of this config with overrides from `lookup` applied. `self` keeps
    /// the file values, so it can be saved without leaking env settings.
    pub fn with_env(&self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = self.clone();
        config.apply_env(lookup);
        config
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Override file values with non-empty variables from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("BPL_BASE_URL") {
            self.league.base_url = url;
        }
        if let Some(token) = var("BPL_TOKEN") {
            self.account.bpl_token = Some(token);
        }
        if let Some(sessid) = var("POESESSID") {
            self.account.poesessid = Some(sessid);
        }
        if let Some(id) = var("PRIVATE_LEAGUE_ID") {
            self.league.private_league_id = Some(id);
        }
        if let Some(secs) = var("POLL_INTERVAL_SECS").and_then(|s| s.trim().parse().ok()) {
            self.settings.poll_interval_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.league.base_url)
            .with_context(|| format!("invalid BPL base url {:?}", self.league.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("BPL base url must start with http:// or https://");
        }
        if self.settings.poll_interval_secs == 0 {
            bail!("poll_interval_secs must be greater than 0");
        }
        self.team_shorts()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.settings.poll_interval_secs)
    }

    /// Built-in team short codes merged with the `[teams]` table.
    pub fn team_shorts(&self) -> Result<HashMap<i64, String>> {
        let mut shorts: HashMap<i64, String> = DEFAULT_TEAM_SHORTS
            .iter()
            .map(|(id, short)| (*id, short.to_string()))
            .collect();
        for (id, short) in &self.teams {
            let id: i64 = id
                .trim()
                .parse()
                .with_context(|| format!("team id {id:?} in [teams] is not a number"))?;
            if short.trim().is_empty() {
                bail!("team {id} has an empty short code");
            }
            shorts.insert(id, short.trim().to_string());
        }
        Ok(shorts)
    }

    pub fn bpl_token(&self) -> Option<&str> {
        self.account.bpl_token.as_deref()
    }

    pub fn require_bpl_token(&self) -> Result<&str> {
        self.bpl_token()
            .context("BPL_TOKEN is not set (env, .env or [account] bpl_token); run setup-account")
    }

    pub fn require_poesessid(&self) -> Result<&str> {
        self.account
            .poesessid
            .as_deref()
            .context("POESESSID is not set (env, .env or [account] poesessid); run setup-account")
    }
}
