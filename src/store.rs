use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::connection::conn;
use crate::database::SqliteStore;
use crate::error::StorageError;
use crate::memory::MemoryStore;
use crate::types::{DrawResult, HistorySnapshot, NewDrawResult, NumberStat, NumberStatUpdate};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence for draws, per-date history snapshots and number statistics.
///
/// Both implementations honour the same contract:
///
/// - draws are append-only and never deduplicated; `latest_result` is the
///   row with the highest id
/// - several snapshots may exist for one date; `history_by_date` returns the
///   most recently created one
/// - `recent_history` orders by `date` descending, then newest first
/// - `upsert_number_stat` overwrites every mutable field of an existing row
/// - `top_number_stats` orders by `occurrences` descending, then `number`
#[async_trait]
pub trait LotteryStore: Send + Sync {
    async fn create_draw_result(&self, input: NewDrawResult) -> Result<DrawResult>;

    /// Draws recorded for `date`, in insertion order.
    async fn results_by_date(&self, date: &str) -> Result<Vec<DrawResult>>;

    async fn latest_result(&self) -> Result<Option<DrawResult>>;

    async fn create_history_snapshot(&self, date: &str, results: Value) -> Result<HistorySnapshot>;

    async fn history_by_date(&self, date: &str) -> Result<Option<HistorySnapshot>>;

    async fn recent_history(&self, limit: usize) -> Result<Vec<HistorySnapshot>>;

    async fn upsert_number_stat(&self, update: NumberStatUpdate) -> Result<NumberStat>;

    async fn number_stat(&self, number: &str) -> Result<Option<NumberStat>>;

    async fn all_number_stats(&self) -> Result<Vec<NumberStat>>;

    async fn top_number_stats(&self, limit: usize) -> Result<Vec<NumberStat>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Sqlite,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> AnyResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "sqlite" => Ok(StoreKind::Sqlite),
            other => Err(anyhow::anyhow!(
                "unknown store kind '{}', expected 'memory' or 'sqlite'",
                other
            )),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Memory => f.write_str("memory"),
            StoreKind::Sqlite => f.write_str("sqlite"),
        }
    }
}

/// Build the configured store. Called once at startup; everything downstream
/// only sees the trait object.
pub fn open_store(config: &Config) -> AnyResult<Arc<dyn LotteryStore>> {
    match config.store {
        StoreKind::Memory => {
            info!("🗃️ Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Sqlite => {
            info!("🗄️ Using SQLite store at {}", config.database_url);
            let connection = conn(&config.database_url)?;
            Ok(Arc::new(SqliteStore::new(connection)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_kind_case_insensitively() {
        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert_eq!(" SQLite ".parse::<StoreKind>().unwrap(), StoreKind::Sqlite);
        assert!("postgres".parse::<StoreKind>().is_err());
    }
}
