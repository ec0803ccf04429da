use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::store::{LotteryStore, Result};
use crate::types::{DrawResult, HistorySnapshot, NewDrawResult, NumberStat, NumberStatUpdate};

#[derive(Default)]
struct Tables {
    draws: Vec<DrawResult>,
    history: Vec<HistorySnapshot>,
    stats: Vec<NumberStat>,
    next_draw_id: i64,
    next_history_id: i64,
}

/// Process-local store for development and tests. Never fails.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LotteryStore for MemoryStore {
    async fn create_draw_result(&self, input: NewDrawResult) -> Result<DrawResult> {
        let mut tables = self.tables.write().await;
        tables.next_draw_id += 1;

        let draw = DrawResult {
            id: tables.next_draw_id,
            date: input.date,
            time: input.time,
            set: input.set,
            value: input.value,
            twod: input.twod,
            open_time: input.open_time,
            created_at: Utc::now(),
        };
        tables.draws.push(draw.clone());
        Ok(draw)
    }

    async fn results_by_date(&self, date: &str) -> Result<Vec<DrawResult>> {
        let tables = self.tables.read().await;
        Ok(tables
            .draws
            .iter()
            .filter(|draw| draw.date == date)
            .cloned()
            .collect())
    }

    async fn latest_result(&self) -> Result<Option<DrawResult>> {
        let tables = self.tables.read().await;
        Ok(tables.draws.iter().max_by_key(|draw| draw.id).cloned())
    }

    async fn create_history_snapshot(&self, date: &str, results: Value) -> Result<HistorySnapshot> {
        let mut tables = self.tables.write().await;
        tables.next_history_id += 1;

        let snapshot = HistorySnapshot {
            id: tables.next_history_id,
            date: date.to_string(),
            results,
            created_at: Utc::now(),
        };
        tables.history.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn history_by_date(&self, date: &str) -> Result<Option<HistorySnapshot>> {
        let tables = self.tables.read().await;
        Ok(tables
            .history
            .iter()
            .filter(|snapshot| snapshot.date == date)
            .max_by_key(|snapshot| snapshot.id)
            .cloned())
    }

    async fn recent_history(&self, limit: usize) -> Result<Vec<HistorySnapshot>> {
        let tables = self.tables.read().await;
        let mut snapshots = tables.history.clone();
        snapshots.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        snapshots.truncate(limit);
        Ok(snapshots)
    }

    async fn upsert_number_stat(&self, update: NumberStatUpdate) -> Result<NumberStat> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.stats.iter_mut().find(|s| s.number == update.number) {
            existing.occurrences = update.occurrences;
            existing.last_seen = Some(update.last_seen);
            existing.frequency = update.frequency;
            return Ok(existing.clone());
        }

        let stat = NumberStat {
            number: update.number,
            occurrences: update.occurrences,
            last_seen: Some(update.last_seen),
            frequency: update.frequency,
        };
        tables.stats.push(stat.clone());
        Ok(stat)
    }

    async fn number_stat(&self, number: &str) -> Result<Option<NumberStat>> {
        let tables = self.tables.read().await;
        Ok(tables.stats.iter().find(|s| s.number == number).cloned())
    }

    async fn all_number_stats(&self) -> Result<Vec<NumberStat>> {
        Ok(self.tables.read().await.stats.clone())
    }

    async fn top_number_stats(&self, limit: usize) -> Result<Vec<NumberStat>> {
        let mut stats = self.tables.read().await.stats.clone();
        stats.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.number.cmp(&b.number))
        });
        stats.truncate(limit);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draw(date: &str, twod: &str) -> NewDrawResult {
        NewDrawResult {
            date: date.to_string(),
            time: "12:01:00".to_string(),
            set: "1,100.01".to_string(),
            value: "52,840.03".to_string(),
            twod: twod.to_string(),
            open_time: "12:01:00".to_string(),
        }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryStore::new();
        let first = store.create_draw_result(draw("2024-03-01", "10")).await.unwrap();
        let second = store.create_draw_result(draw("2024-03-01", "11")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.latest_result().await.unwrap().unwrap().twod, "11");
    }

    #[tokio::test]
    async fn newest_snapshot_wins_for_a_date() {
        let store = MemoryStore::new();
        store
            .create_history_snapshot("2024-03-01", json!({"v": 1}))
            .await
            .unwrap();
        store
            .create_history_snapshot("2024-03-01", json!({"v": 2}))
            .await
            .unwrap();

        let snapshot = store.history_by_date("2024-03-01").await.unwrap().unwrap();
        assert_eq!(snapshot.results, json!({"v": 2}));
    }
}
