//! Upstream payload normalization.
//!
//! The three upstream feeds disagree on field names (`time` vs `open_time`,
//! `stock_date` vs nothing at all) and on envelope shape (bare array vs
//! `{"result": [...]}`). Everything that reads upstream draw records goes
//! through this module. History payloads are snapshotted whole and never
//! decomposed into draws.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::types::{LiveResult, NewDrawResult, PLACEHOLDER, TodayResult};
use crate::utils::{format_draw_date, format_timestamp};

/// A raw upstream payload tagged with the feed it came from.
#[derive(Debug, Clone, Copy)]
pub enum UpstreamPayload<'a> {
    Live(&'a Value),
    Results(&'a Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    Placeholder(&'static str),
    MalformedTwod(String),
}

#[derive(Debug, Default)]
pub struct Normalized {
    pub eligible: Vec<NewDrawResult>,
    pub skipped: Vec<SkipReason>,
}

struct FieldMap {
    date: &'static [&'static str],
    time: &'static [&'static str],
    open_time: &'static [&'static str],
}

const LIVE_FIELDS: FieldMap = FieldMap {
    date: &["stock_date", "date"],
    time: &["time"],
    open_time: &["time"],
};

const RESULT_FIELDS: FieldMap = FieldMap {
    date: &["stock_date", "date"],
    time: &["open_time", "time"],
    open_time: &["open_time", "time"],
};

/// Turn an upstream payload into the draws worth storing.
///
/// Records missing `set`, `value` or `twod`, carrying the `--` placeholder,
/// or whose `twod` is not exactly two digits are reported in `skipped`.
/// Numeric JSON values are accepted as text; a numeric `twod` is zero-padded.
pub fn normalize(payload: UpstreamPayload<'_>, now: DateTime<Utc>) -> Normalized {
    let (items, fields) = match payload {
        UpstreamPayload::Live(value) => (single(value), &LIVE_FIELDS),
        UpstreamPayload::Results(value) => (list(value), &RESULT_FIELDS),
    };

    let today = format_draw_date(now);
    let timestamp = format_timestamp(now);
    let mut normalized = Normalized::default();

    for item in items {
        match draw_fields(item) {
            Ok((set, value, twod)) => {
                let date = first_text(item, fields.date)
                    .unwrap_or(Cow::Borrowed(today.as_str()));
                let time = first_text(item, fields.time)
                    .unwrap_or(Cow::Borrowed(timestamp.as_str()));
                let open_time = first_text(item, fields.open_time)
                    .unwrap_or(Cow::Borrowed(timestamp.as_str()));

                normalized.eligible.push(NewDrawResult {
                    date: date.into_owned(),
                    time: time.into_owned(),
                    set: set.into_owned(),
                    value: value.into_owned(),
                    twod: twod.into_owned(),
                    open_time: open_time.into_owned(),
                });
            }
            Err(reason) => normalized.skipped.push(reason),
        }
    }

    normalized
}

type DrawFields<'a> = (Cow<'a, str>, Cow<'a, str>, Cow<'a, str>);

fn draw_fields(item: &Value) -> Result<DrawFields<'_>, SkipReason> {
    let set = required(item, "set")?;
    let value = required(item, "value")?;
    let twod = required(item, "twod")?;

    if twod.len() != 2 || !twod.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SkipReason::MalformedTwod(twod.into_owned()));
    }

    Ok((set, value, twod))
}

fn required<'a>(item: &'a Value, key: &'static str) -> Result<Cow<'a, str>, SkipReason> {
    match text(item, key) {
        None => Err(SkipReason::MissingField(key)),
        Some(found) if found == PLACEHOLDER => Err(SkipReason::Placeholder(key)),
        Some(found) => Ok(found),
    }
}

fn text<'a>(item: &'a Value, key: &str) -> Option<Cow<'a, str>> {
    match item.get(key)? {
        Value::String(s) => Some(s.trim())
            .filter(|s| !s.is_empty())
            .map(Cow::Borrowed),
        // JSON numbers drop leading zeros; "twod": 7 is draw "07".
        Value::Number(n) if key == "twod" => match n.as_u64() {
            Some(d) if d < 100 => Some(Cow::Owned(format!("{d:02}"))),
            _ => Some(Cow::Owned(n.to_string())),
        },
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn first_text<'a>(item: &'a Value, keys: &[&str]) -> Option<Cow<'a, str>> {
    keys.iter().find_map(|key| text(item, key))
}

fn single(value: &Value) -> Vec<&Value> {
    if value.is_object() {
        vec![value]
    } else {
        Vec::new()
    }
}

fn list(value: &Value) -> Vec<&Value> {
    value
        .as_array()
        .or_else(|| value.get("result").and_then(Value::as_array))
        .map(|items| items.iter().collect())
        .unwrap_or_default()
}

fn display(item: &Value, keys: &[&str]) -> String {
    first_text(item, keys).map_or_else(|| PLACEHOLDER.to_string(), Cow::into_owned)
}

impl LiveResult {
    /// Render the live feed for display; `None` when upstream sent no object.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let item = single(payload).into_iter().next()?;
        Some(Self {
            set: display(item, &["set"]),
            value: display(item, &["value"]),
            time: display(item, LIVE_FIELDS.time),
            twod: display(item, &["twod"]),
        })
    }
}

/// Render a list-shaped payload (bare array or `{"result": [...]}`) for display.
pub fn today_results(payload: &Value) -> Vec<TodayResult> {
    list(payload)
        .into_iter()
        .map(|item| TodayResult {
            set: display(item, &["set"]),
            value: display(item, &["value"]),
            open_time: display(item, RESULT_FIELDS.open_time),
            twod: display(item, &["twod"]),
        })
        .collect()
}
