use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::store::StoreKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreKind,
    pub database_url: String,
    pub upstream: UpstreamConfig,
    /// Server-side ingestion interval; `0` leaves refreshing to the clients.
    pub refresh_minutes: u64,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub live_url: String,
    pub today_url: String,
    pub results_url: String,
    pub history_url: String,
    pub timeout_secs: u64,
}

pub fn load() -> Result<Config> {
    from_lookup(|key| env::var(key).ok())
}

/// Build a config from any key lookup, so tests need not touch the process env.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

    let upstream = UpstreamConfig {
        live_url: text("LOTTERY_LIVE_URL", "https://thaistock2d.com/live"),
        today_url: text("LOTTERY_TODAY_URL", "https://thaistock2d.com/result"),
        results_url: text("LOTTERY_RESULTS_URL", "https://api.thaistock2d.com/2d_result"),
        history_url: text("LOTTERY_HISTORY_URL", "https://api.thaistock2d.com/history"),
        timeout_secs: parsed(&lookup, "LOTTERY_UPSTREAM_TIMEOUT_SECS", 10)?,
    };

    Ok(Config {
        host: text("LOTTERY_HOST", "0.0.0.0"),
        port: parsed(&lookup, "LOTTERY_PORT", 5000)?,
        store: parsed(&lookup, "LOTTERY_STORE", StoreKind::Sqlite)?,
        database_url: text("LOTTERY_DB_PATH", "data/lottery.db"),
        upstream,
        refresh_minutes: parsed(&lookup, "LOTTERY_REFRESH_MINUTES", 0)?,
    })
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}
