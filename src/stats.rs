use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::store::{LotteryStore, Result};
use crate::types::{NumberStat, NumberStatUpdate};

/// Multiplier turning an occurrence count into the displayed percentage.
/// Not divided by the total number of draws.
pub const FREQUENCY_WEIGHT: f64 = 0.85;

pub const FIRST_SEEN_FREQUENCY: &str = "0.85%";

pub fn format_frequency(occurrences: i64) -> String {
    format!("{}%", occurrences as f64 * FREQUENCY_WEIGHT)
}

/// Keeps `NumberStat` rows current as draws are ingested.
pub struct StatsUpdater {
    store: Arc<dyn LotteryStore>,
    // Serialises read-modify-write so concurrent observations are not lost.
    lock: Mutex<()>,
}

impl StatsUpdater {
    pub fn new(store: Arc<dyn LotteryStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub async fn record(&self, number: &str) -> Result<NumberStat> {
        let _guard = self.lock.lock().await;

        let current = self.store.number_stat(number).await?;
        let update = match current {
            Some(stat) => {
                let occurrences = stat.occurrences + 1;
                NumberStatUpdate {
                    number: number.to_string(),
                    occurrences,
                    last_seen: Utc::now(),
                    frequency: format_frequency(occurrences),
                }
            }
            None => NumberStatUpdate {
                number: number.to_string(),
                occurrences: 1,
                last_seen: Utc::now(),
                frequency: FIRST_SEEN_FREQUENCY.to_string(),
            },
        };

        let stat = self.store.upsert_number_stat(update).await?;
        debug!(
            "number {} seen {} times ({})",
            stat.number, stat.occurrences, stat.frequency
        );
        Ok(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[test]
    fn frequency_is_a_flat_multiple() {
        assert_eq!(format_frequency(1), "0.85%");
        assert_eq!(format_frequency(2), "1.7%");
        assert_eq!(format_frequency(20), "17%");
    }

    #[tokio::test]
    async fn first_and_second_observation() {
        let store: Arc<dyn LotteryStore> = Arc::new(MemoryStore::new());
        let updater = StatsUpdater::new(Arc::clone(&store));

        let first = updater.record("07").await.unwrap();
        assert_eq!(first.occurrences, 1);
        assert_eq!(first.frequency, "0.85%");
        assert!(first.last_seen.is_some());

        let second = updater.record("07").await.unwrap();
        assert_eq!(second.occurrences, 2);
        assert_eq!(second.frequency, "1.7%");

        assert_eq!(store.all_number_stats().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_observations_are_all_counted() {
        let store: Arc<dyn LotteryStore> = Arc::new(MemoryStore::new());
        let updater = Arc::new(StatsUpdater::new(Arc::clone(&store)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let updater = Arc::clone(&updater);
            handles.push(tokio::spawn(async move { updater.record("33").await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stat = store.number_stat("33").await.unwrap().unwrap();
        assert_eq!(stat.occurrences, 16);
    }
}
