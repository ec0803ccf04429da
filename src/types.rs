use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown in place of a field the upstream has not filled in yet.
pub const PLACEHOLDER: &str = "--";

/// One stored draw. Rows are append-only; `id` grows monotonically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub set: String,
    pub value: String,
    pub twod: String,
    pub open_time: String,
    pub created_at: DateTime<Utc>,
}

/// A draw that passed validation and is ready to be appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDrawResult {
    pub date: String,
    pub time: String,
    pub set: String,
    pub value: String,
    pub twod: String,
    pub open_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub id: i64,
    pub date: String,
    pub results: Value,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counter for one two-digit number, keyed by `number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberStat {
    pub number: String,
    pub occurrences: i64,
    pub last_seen: Option<DateTime<Utc>>,
    pub frequency: String,
}

impl NumberStat {
    /// The shape reported for a number that has never been observed.
    pub fn unseen(number: &str) -> Self {
        Self {
            number: number.to_string(),
            occurrences: 0,
            last_seen: None,
            frequency: "0%".to_string(),
        }
    }
}

/// Replacement values for a stat row; applied as a full overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberStatUpdate {
    pub number: String,
    pub occurrences: i64,
    pub last_seen: DateTime<Utc>,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveResult {
    pub set: String,
    pub value: String,
    pub time: String,
    pub twod: String,
}

impl From<&DrawResult> for LiveResult {
    fn from(draw: &DrawResult) -> Self {
        Self {
            set: draw.set.clone(),
            value: draw.value.clone(),
            time: draw.time.clone(),
            twod: draw.twod.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayResult {
    pub set: String,
    pub value: String,
    pub open_time: String,
    pub twod: String,
}

impl From<&DrawResult> for TodayResult {
    fn from(draw: &DrawResult) -> Self {
        Self {
            set: draw.set.clone(),
            value: draw.value.clone(),
            open_time: draw.open_time.clone(),
            twod: draw.twod.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveResponse {
    pub live: Option<LiveResult>,
    pub result: Vec<TodayResult>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cached: bool,
}

/// `/results` passes the upstream payload through untouched when it is
/// reachable and rebuilds a minimal list from storage when it is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultsResponse {
    Fresh(Value),
    Cached { result: Vec<TodayResult> },
}

impl ResultsResponse {
    pub fn is_cached(&self) -> bool {
        matches!(self, ResultsResponse::Cached { .. })
    }
}
