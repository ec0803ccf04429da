use crate::error::StorageError;
use crate::store::{LotteryStore, Result as StoreResult};
use crate::types::{DrawResult, HistorySnapshot, NewDrawResult, NumberStat, NumberStatUpdate};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result, Row};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS draw_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            set_id TEXT NOT NULL,
            value TEXT NOT NULL,
            twod TEXT NOT NULL,
            open_time TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS history_snapshots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            results TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS number_stats (
            number TEXT PRIMARY KEY,
            occurrences INTEGER NOT NULL DEFAULT 0,
            last_seen TEXT,
            frequency TEXT NOT NULL DEFAULT '0%'
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_draw_results_date ON draw_results(date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_history_snapshots_date ON history_snapshots(date)",
        [],
    )?;

    Ok(())
}

fn draw_from_row(row: &Row<'_>) -> Result<DrawResult> {
    Ok(DrawResult {
        id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        set: row.get(3)?,
        value: row.get(4)?,
        twod: row.get(5)?,
        open_time: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn snapshot_from_row(row: &Row<'_>) -> Result<HistorySnapshot> {
    Ok(HistorySnapshot {
        id: row.get(0)?,
        date: row.get(1)?,
        results: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn stat_from_row(row: &Row<'_>) -> Result<NumberStat> {
    Ok(NumberStat {
        number: row.get(0)?,
        occurrences: row.get(1)?,
        last_seen: row.get(2)?,
        frequency: row.get(3)?,
    })
}

pub fn insert_draw_result(conn: &Connection, input: &NewDrawResult) -> Result<DrawResult> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO draw_results (date, time, set_id, value, twod, open_time, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &input.date,
            &input.time,
            &input.set,
            &input.value,
            &input.twod,
            &input.open_time,
            created_at,
        ),
    )?;

    Ok(DrawResult {
        id: conn.last_insert_rowid(),
        date: input.date.clone(),
        time: input.time.clone(),
        set: input.set.clone(),
        value: input.value.clone(),
        twod: input.twod.clone(),
        open_time: input.open_time.clone(),
        created_at,
    })
}

pub fn get_draw_results_by_date(conn: &Connection, date: &str) -> Result<Vec<DrawResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, time, set_id, value, twod, open_time, created_at
         FROM draw_results WHERE date = ?1 ORDER BY id",
    )?;
    let draw_iter = stmt.query_map([date], draw_from_row)?;

    let mut results = Vec::new();
    for draw in draw_iter {
        results.push(draw?);
    }
    Ok(results)
}

pub fn get_latest_draw_result(conn: &Connection) -> Result<Option<DrawResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, time, set_id, value, twod, open_time, created_at
         FROM draw_results ORDER BY id DESC LIMIT 1",
    )?;
    stmt.query_row([], draw_from_row).optional()
}

pub fn insert_history_snapshot(
    conn: &Connection,
    date: &str,
    results: Value,
) -> Result<HistorySnapshot> {
    let created_at = Utc::now();
    conn.execute(
        "INSERT INTO history_snapshots (date, results, created_at) VALUES (?1, ?2, ?3)",
        (date, &results, created_at),
    )?;

    Ok(HistorySnapshot {
        id: conn.last_insert_rowid(),
        date: date.to_string(),
        results,
        created_at,
    })
}

pub fn get_history_by_date(conn: &Connection, date: &str) -> Result<Option<HistorySnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, results, created_at
         FROM history_snapshots WHERE date = ?1
         ORDER BY id DESC LIMIT 1",
    )?;
    stmt.query_row([date], snapshot_from_row).optional()
}

pub fn get_recent_history(conn: &Connection, limit: i64) -> Result<Vec<HistorySnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, results, created_at
         FROM history_snapshots
         ORDER BY date DESC, id DESC
         LIMIT ?1",
    )?;
    let history_iter = stmt.query_map([limit], snapshot_from_row)?;

    let mut results = Vec::new();
    for snapshot in history_iter {
        results.push(snapshot?);
    }
    Ok(results)
}

pub fn upsert_number_stat(conn: &Connection, update: &NumberStatUpdate) -> Result<NumberStat> {
    let mut stmt = conn.prepare(
        "INSERT INTO number_stats (number, occurrences, last_seen, frequency)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(number) DO UPDATE SET
            occurrences = excluded.occurrences,
            last_seen = excluded.last_seen,
            frequency = excluded.frequency
         RETURNING number, occurrences, last_seen, frequency",
    )?;
    stmt.query_row(
        (
            &update.number,
            update.occurrences,
            update.last_seen,
            &update.frequency,
        ),
        stat_from_row,
    )
}

pub fn get_number_stat(conn: &Connection, number: &str) -> Result<Option<NumberStat>> {
    let mut stmt = conn.prepare(
        "SELECT number, occurrences, last_seen, frequency FROM number_stats WHERE number = ?1",
    )?;
    stmt.query_row([number], stat_from_row).optional()
}

pub fn get_all_number_stats(conn: &Connection) -> Result<Vec<NumberStat>> {
    let mut stmt =
        conn.prepare("SELECT number, occurrences, last_seen, frequency FROM number_stats")?;
    let stat_iter = stmt.query_map([], stat_from_row)?;

    let mut results = Vec::new();
    for stat in stat_iter {
        results.push(stat?);
    }
    Ok(results)
}

pub fn get_top_number_stats(conn: &Connection, limit: i64) -> Result<Vec<NumberStat>> {
    let mut stmt = conn.prepare(
        "SELECT number, occurrences, last_seen, frequency
         FROM number_stats
         ORDER BY occurrences DESC, number ASC
         LIMIT ?1",
    )?;
    let stat_iter = stmt.query_map([limit], stat_from_row)?;

    let mut results = Vec::new();
    for stat in stat_iter {
        results.push(stat?);
    }
    Ok(results)
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Durable store on a single SQLite connection. Queries run on tokio's
/// blocking pool so disk I/O never stalls the request workers.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Expects a connection whose schema has already been created.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || -> StoreResult<T> {
            let conn = conn.lock().map_err(|_| StorageError::Poisoned)?;
            Ok(f(&*conn)?)
        })
        .await?
    }
}

#[async_trait]
impl LotteryStore for SqliteStore {
    async fn create_draw_result(&self, input: NewDrawResult) -> StoreResult<DrawResult> {
        self.with_conn(move |conn| insert_draw_result(conn, &input))
            .await
    }

    async fn results_by_date(&self, date: &str) -> StoreResult<Vec<DrawResult>> {
        let date = date.to_string();
        self.with_conn(move |conn| get_draw_results_by_date(conn, &date))
            .await
    }

    async fn latest_result(&self) -> StoreResult<Option<DrawResult>> {
        self.with_conn(get_latest_draw_result).await
    }

    async fn create_history_snapshot(
        &self,
        date: &str,
        results: Value,
    ) -> StoreResult<HistorySnapshot> {
        let date = date.to_string();
        self.with_conn(move |conn| insert_history_snapshot(conn, &date, results))
            .await
    }

    async fn history_by_date(&self, date: &str) -> StoreResult<Option<HistorySnapshot>> {
        let date = date.to_string();
        self.with_conn(move |conn| get_history_by_date(conn, &date))
            .await
    }

    async fn recent_history(&self, limit: usize) -> StoreResult<Vec<HistorySnapshot>> {
        let limit = sql_limit(limit);
        self.with_conn(move |conn| get_recent_history(conn, limit))
            .await
    }

    async fn upsert_number_stat(&self, update: NumberStatUpdate) -> StoreResult<NumberStat> {
        self.with_conn(move |conn| upsert_number_stat(conn, &update))
            .await
    }

    async fn number_stat(&self, number: &str) -> StoreResult<Option<NumberStat>> {
        let number = number.to_string();
        self.with_conn(move |conn| get_number_stat(conn, &number))
            .await
    }

    async fn all_number_stats(&self) -> StoreResult<Vec<NumberStat>> {
        self.with_conn(get_all_number_stats).await
    }

    async fn top_number_stats(&self, limit: usize) -> StoreResult<Vec<NumberStat>> {
        let limit = sql_limit(limit);
        self.with_conn(move |conn| get_top_number_stats(conn, limit))
            .await
    }
}
