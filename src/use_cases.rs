use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::LotterySource;
use crate::error::{Feed, LotteryError, StorageError};
use crate::normalize::{Normalized, UpstreamPayload, normalize, today_results};
use crate::stats::StatsUpdater;
use crate::store::LotteryStore;
use crate::types::{
    DrawResult, HistorySnapshot, LiveResponse, LiveResult, NumberStat, ResultsResponse,
    TodayResult,
};
use crate::utils::today;

/// The only writer: pulls from upstream, stores what it can and falls back
/// to stored data when upstream is unreachable.
pub struct IngestUseCase {
    store: Arc<dyn LotteryStore>,
    source: Arc<dyn LotterySource>,
    stats: StatsUpdater,
}

impl IngestUseCase {
    pub fn new(store: Arc<dyn LotteryStore>, source: Arc<dyn LotterySource>) -> Self {
        let stats = StatsUpdater::new(Arc::clone(&store));
        Self {
            store,
            source,
            stats,
        }
    }

    pub async fn ingest_live(&self) -> Result<LiveResponse, LotteryError> {
        let (live, today_list) = tokio::join!(self.source.fetch_live(), self.source.fetch_today());

        let (live, today_list) = match (live, today_list) {
            (Ok(live), Ok(today_list)) => (live, today_list),
            (live, today_list) => {
                if let Err(e) = &live {
                    warn!("live feed failed: {}", e);
                }
                if let Err(e) = &today_list {
                    warn!("today feed failed: {}", e);
                }
                return self.cached_live().await;
            }
        };

        let normalized = normalize(UpstreamPayload::Live(&live), Utc::now());
        self.persist(Feed::Live, normalized).await;

        Ok(LiveResponse {
            live: LiveResult::from_payload(&live),
            result: today_results(&today_list),
            cached: false,
        })
    }

    pub async fn ingest_results(&self) -> Result<ResultsResponse, LotteryError> {
        match self.source.fetch_results().await {
            Ok(payload) => {
                let normalized = normalize(UpstreamPayload::Results(&payload), Utc::now());
                self.persist(Feed::Results, normalized).await;
                Ok(ResultsResponse::Fresh(payload))
            }
            Err(e) => {
                warn!("results feed failed: {}", e);
                let cached = self.cached_today().await;
                if cached.is_empty() {
                    return Err(LotteryError::UpstreamUnavailable(Feed::Results));
                }
                info!("📦 Serving {} cached results", cached.len());
                Ok(ResultsResponse::Cached {
                    result: cached.iter().map(TodayResult::from).collect(),
                })
            }
        }
    }

    pub async fn ingest_history(&self, date: &str) -> Result<Value, LotteryError> {
        match self.source.fetch_history(date).await {
            Ok(payload) => {
                // Snapshots are kept verbatim; history never feeds the draw log.
                if let Err(e) = self
                    .store
                    .create_history_snapshot(date, payload.clone())
                    .await
                {
                    warn!("failed to store history for {}: {}", date, e);
                }
                Ok(payload)
            }
            Err(e) => {
                warn!("history feed failed for {}: {}", date, e);
                match self.store.history_by_date(date).await {
                    Ok(Some(snapshot)) => {
                        info!("📦 Serving cached history for {}", date);
                        Ok(snapshot.results)
                    }
                    Ok(None) => Err(LotteryError::UpstreamUnavailable(Feed::History)),
                    Err(e) => {
                        warn!("history cache read failed for {}: {}", date, e);
                        Err(LotteryError::UpstreamUnavailable(Feed::History))
                    }
                }
            }
        }
    }

    /// Store each eligible draw and count its number. Every write is
    /// independent; failures are logged and never reach the caller.
    async fn persist(&self, feed: Feed, normalized: Normalized) {
        for reason in &normalized.skipped {
            debug!("{} record skipped: {:?}", feed, reason);
        }

        let mut stored = 0;
        for draw in normalized.eligible {
            let twod = draw.twod.clone();

            match self.store.create_draw_result(draw).await {
                Ok(_) => stored += 1,
                Err(e) => warn!("failed to store {} draw {}: {}", feed, twod, e),
            }
            if let Err(e) = self.stats.record(&twod).await {
                warn!("failed to update stats for {}: {}", twod, e);
            }
        }

        if stored > 0 {
            info!("🎲 Stored {} {} draw(s)", stored, feed);
        }
    }

    async fn cached_live(&self) -> Result<LiveResponse, LotteryError> {
        let latest = match self.store.latest_result().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!("latest result cache read failed: {}", e);
                None
            }
        };
        let cached = self.cached_today().await;

        if latest.is_none() && cached.is_empty() {
            return Err(LotteryError::UpstreamUnavailable(Feed::Live));
        }

        info!("📦 Serving cached live data");
        Ok(LiveResponse {
            live: latest.as_ref().map(LiveResult::from),
            result: cached.iter().map(TodayResult::from).collect(),
            cached: true,
        })
    }

    async fn cached_today(&self) -> Vec<DrawResult> {
        match self.store.results_by_date(&today()).await {
            Ok(results) => results,
            Err(e) => {
                warn!("today's results cache read failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Read-only access for the HTTP layer.
pub struct QueryUseCase {
    store: Arc<dyn LotteryStore>,
}

fn query_failed(what: &'static str) -> impl FnOnce(StorageError) -> LotteryError {
    move |source| LotteryError::QueryFailed { what, source }
}

impl QueryUseCase {
    pub fn new(store: Arc<dyn LotteryStore>) -> Self {
        Self { store }
    }

    pub async fn results_by_date(&self, date: &str) -> Result<Vec<DrawResult>, LotteryError> {
        let mut results = self
            .store
            .results_by_date(date)
            .await
            .map_err(query_failed("results"))?;
        results.sort_by_key(|draw| draw.id);
        Ok(results)
    }

    pub async fn recent_history(&self, days: usize) -> Result<Vec<HistorySnapshot>, LotteryError> {
        self.store
            .recent_history(days)
            .await
            .map_err(query_failed("recent history"))
    }

    /// Never fails for an unseen number; reports a zero-valued stat instead.
    pub async fn number_stat(&self, number: &str) -> Result<NumberStat, LotteryError> {
        let stat = self
            .store
            .number_stat(number)
            .await
            .map_err(query_failed("number statistics"))?;
        Ok(stat.unwrap_or_else(|| NumberStat::unseen(number)))
    }

    pub async fn popular_numbers(&self, limit: usize) -> Result<Vec<NumberStat>, LotteryError> {
        self.store
            .top_number_stats(limit)
            .await
            .map_err(query_failed("popular numbers"))
    }

    pub async fn all_stats(&self) -> Result<Vec<NumberStat>, LotteryError> {
        self.store
            .all_number_stats()
            .await
            .map_err(query_failed("all statistics"))
    }
}
