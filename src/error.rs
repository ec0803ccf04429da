use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage connection lock poisoned")]
    Poisoned,

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream answered with status {0}")]
    Status(u16),
}

/// The upstream feeds the ingestion pipeline proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Live,
    Results,
    History,
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feed::Live => "live",
            Feed::Results => "results",
            Feed::History => "history",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("{0} feed unreachable and nothing cached")]
    UpstreamUnavailable(Feed),

    #[error("failed to fetch {what}: {source}")]
    QueryFailed {
        what: &'static str,
        #[source]
        source: StorageError,
    },
}

impl IntoResponse for LotteryError {
    fn into_response(self) -> Response {
        let body = match &self {
            LotteryError::UpstreamUnavailable(Feed::Live) => json!({
                "error": "Failed to fetch lottery data",
                "message": "Unable to connect to lottery service"
            }),
            LotteryError::UpstreamUnavailable(Feed::Results) => json!({
                "error": "Failed to fetch results and no cached data available"
            }),
            LotteryError::UpstreamUnavailable(Feed::History) => json!({
                "error": "Failed to fetch history and no cached data available"
            }),
            LotteryError::QueryFailed { what, .. } => json!({
                "error": format!("Failed to fetch {}", what)
            }),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
