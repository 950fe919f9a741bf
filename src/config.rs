//! Engine configuration.
//!
//! Everything comes from the environment with sane defaults, so a bare
//! `cargo run` works; `.env` is honored in local runs. Ticker aliases have a
//! built-in table that an optional TOML file can extend or override.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

const ENV_ALIASES_PATH: &str = "ALIASES_PATH";
const DEFAULT_ALIASES_PATH: &str = "config/aliases.toml";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Alert when |current - previous| >= this. Must be in (0, 1).
    pub alert_threshold: f64,
    /// Scheduled-pass cadence in hours; 1..=24 recommended.
    pub check_interval_hours: u64,
    pub throttle_capacity: usize,
    pub throttle_window_secs: u64,
    /// Batch size limit per fetch.
    pub post_limit: usize,
    /// Only items from the last N hours are fetched.
    pub recency_window_hours: u64,
    /// Per-subject fetch timeout; a timeout skips the subject for one pass.
    pub fetch_timeout_secs: u64,
    /// Ticker -> canonical subject (btc -> bitcoin, ...).
    pub aliases: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alert_threshold: 0.3,
            check_interval_hours: 4,
            throttle_capacity: 10,
            throttle_window_secs: 60,
            post_limit: 50,
            recency_window_hours: 24,
            fetch_timeout_secs: 30,
            aliases: builtin_aliases(),
        }
    }
}

impl EngineConfig {
    /// Build from environment variables, falling back to defaults, then
    /// validate. Present-but-unparsable values fail loudly instead of being
    /// silently replaced.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self {
            alert_threshold: env_parse("ALERT_THRESHOLD", 0.3)?,
            check_interval_hours: env_parse("CHECK_INTERVAL_HOURS", 4)?,
            throttle_capacity: env_parse("THROTTLE_CAPACITY", 10)?,
            throttle_window_secs: env_parse("THROTTLE_WINDOW_SECS", 60)?,
            post_limit: env_parse("POST_LIMIT", 50)?,
            recency_window_hours: env_parse("RECENCY_WINDOW_HOURS", 24)?,
            fetch_timeout_secs: env_parse("FETCH_TIMEOUT_SECS", 30)?,
            aliases: builtin_aliases(),
        };

        if let Some(extra) = load_aliases_default()? {
            cfg.aliases.extend(extra);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.alert_threshold > 0.0 && self.alert_threshold < 1.0) {
            bail!(
                "ALERT_THRESHOLD must be in (0, 1), got {}",
                self.alert_threshold
            );
        }
        if self.throttle_capacity == 0 {
            bail!("THROTTLE_CAPACITY must be at least 1");
        }
        if self.throttle_window_secs == 0 {
            bail!("THROTTLE_WINDOW_SECS must be at least 1");
        }
        if self.post_limit == 0 {
            bail!("POST_LIMIT must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            bail!("FETCH_TIMEOUT_SECS must be at least 1");
        }
        // The scheduler builds a tokio interval from this; a zero period
        // panics inside the spawned task and kills the pass silently.
        if self.check_interval_hours == 0 {
            bail!("CHECK_INTERVAL_HOURS must be at least 1");
        }
        if self.check_interval_hours.checked_mul(3600).is_none() {
            bail!(
                "CHECK_INTERVAL_HOURS is too large ({} hours overflows seconds)",
                self.check_interval_hours
            );
        }
        if self.check_interval_hours > 24 {
            tracing::warn!(
                hours = self.check_interval_hours,
                "CHECK_INTERVAL_HOURS outside the recommended 1..=24 range"
            );
        }
        Ok(())
    }

    /// Map a validated subject through the alias table.
    pub fn resolve_alias(&self, subject: &str) -> String {
        self.aliases
            .get(subject)
            .cloned()
            .unwrap_or_else(|| subject.to_string())
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn builtin_aliases() -> HashMap<String, String> {
    [
        ("btc", "bitcoin"),
        ("eth", "ethereum"),
        ("sol", "solana"),
        ("ada", "cardano"),
        ("xrp", "ripple"),
        ("doge", "dogecoin"),
        ("dot", "polkadot"),
        ("matic", "polygon"),
        ("avax", "avalanche"),
        ("link", "chainlink"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Optional alias overrides:
/// 1) $ALIASES_PATH (must exist if set)
/// 2) config/aliases.toml
fn load_aliases_default() -> Result<Option<HashMap<String, String>>> {
    if let Ok(p) = std::env::var(ENV_ALIASES_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            bail!("ALIASES_PATH points to a non-existent path");
        }
        return load_aliases_from(&pb).map(Some);
    }
    let fallback = PathBuf::from(DEFAULT_ALIASES_PATH);
    if fallback.exists() {
        return load_aliases_from(&fallback).map(Some);
    }
    Ok(None)
}

fn load_aliases_from(path: &Path) -> Result<HashMap<String, String>> {
    #[derive(serde::Deserialize)]
    struct AliasFile {
        aliases: HashMap<String, String>,
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading aliases from {}", path.display()))?;
    let parsed: AliasFile = toml::from_str(&content)
        .with_context(|| format!("parsing aliases from {}", path.display()))?;
    Ok(parsed
        .aliases
        .into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_lowercase()))
        .collect())
}
