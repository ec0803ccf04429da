#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lotto2d_lib::{
    DrawResult, HistorySnapshot, LotterySource, LotteryStore, MemoryStore, NewDrawResult,
    NumberStat, NumberStatUpdate, StorageError, UpstreamError,
};
use serde_json::{Value, json};

/// A `LotterySource` that replays canned payloads; `None` simulates an
/// upstream answering 503.
#[derive(Default)]
pub struct ScriptedSource {
    pub live: Option<Value>,
    pub today: Option<Value>,
    pub results: Option<Value>,
    pub history: Option<Value>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn down() -> Self {
        Self::default()
    }

    fn reply(&self, payload: &Option<Value>) -> Result<Value, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        payload.clone().ok_or(UpstreamError::Status(503))
    }
}

#[async_trait]
impl LotterySource for ScriptedSource {
    async fn fetch_live(&self) -> Result<Value, UpstreamError> {
        self.reply(&self.live)
    }

    async fn fetch_today(&self) -> Result<Value, UpstreamError> {
        self.reply(&self.today)
    }

    async fn fetch_results(&self) -> Result<Value, UpstreamError> {
        self.reply(&self.results)
    }

    async fn fetch_history(&self, _date: &str) -> Result<Value, UpstreamError> {
        self.reply(&self.history)
    }
}

/// A `LotteryStore` whose every call fails, as a store with a poisoned
/// connection lock would.
pub struct BrokenStore;

type StoreResult<T> = Result<T, StorageError>;

#[async_trait]
impl LotteryStore for BrokenStore {
    async fn create_draw_result(&self, _input: NewDrawResult) -> StoreResult<DrawResult> {
        Err(StorageError::Poisoned)
    }

    async fn results_by_date(&self, _date: &str) -> StoreResult<Vec<DrawResult>> {
        Err(StorageError::Poisoned)
    }

    async fn latest_result(&self) -> StoreResult<Option<DrawResult>> {
        Err(StorageError::Poisoned)
    }

    async fn create_history_snapshot(
        &self,
        _date: &str,
        _results: Value,
    ) -> StoreResult<HistorySnapshot> {
        Err(StorageError::Poisoned)
    }

    async fn history_by_date(&self, _date: &str) -> StoreResult<Option<HistorySnapshot>> {
        Err(StorageError::Poisoned)
    }

    async fn recent_history(&self, _limit: usize) -> StoreResult<Vec<HistorySnapshot>> {
        Err(StorageError::Poisoned)
    }

    async fn upsert_number_stat(&self, _update: NumberStatUpdate) -> StoreResult<NumberStat> {
        Err(StorageError::Poisoned)
    }

    async fn number_stat(&self, _number: &str) -> StoreResult<Option<NumberStat>> {
        Err(StorageError::Poisoned)
    }

    async fn all_number_stats(&self) -> StoreResult<Vec<NumberStat>> {
        Err(StorageError::Poisoned)
    }

    async fn top_number_stats(&self, _limit: usize) -> StoreResult<Vec<NumberStat>> {
        Err(StorageError::Poisoned)
    }
}

pub fn broken_store() -> Arc<dyn LotteryStore> {
    Arc::new(BrokenStore)
}

pub fn memory_store() -> Arc<dyn LotteryStore> {
    Arc::new(MemoryStore::new())
}

pub fn live_payload(twod: &str) -> Value {
    json!({
        "set": "1,100.01",
        "value": "52,840.03",
        "time": "16:31:58",
        "twod": twod
    })
}

pub fn draw(date: &str, time: &str, twod: &str) -> NewDrawResult {
    NewDrawResult {
        date: date.to_string(),
        time: time.to_string(),
        set: "1,100.01".to_string(),
        value: "52,840.03".to_string(),
        twod: twod.to_string(),
        open_time: time.to_string(),
    }
}
