use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::use_cases::IngestUseCase;

/// Periodically pull the batch results feed so the cache stays warm even
/// when no browser is polling.
pub fn spawn(ingest: Arc<IngestUseCase>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match ingest.ingest_results().await {
                Ok(response) if response.is_cached() => {
                    warn!("🔁 Scheduled refresh served from cache; upstream unreachable")
                }
                Ok(_) => info!("🔁 Scheduled refresh completed"),
                Err(e) => warn!("🔁 Scheduled refresh failed: {}", e),
            }
        }
    })
}
