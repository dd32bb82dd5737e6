//! Turns a raw event feed response into the dated record stored in the sheet.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// One event feed response, as far as this crate cares about it. The
/// problem-detail fields are only read when `_embedded` is absent, so their
/// types are left open.
#[derive(Deserialize, Debug)]
struct EventBatch {
    #[serde(rename = "_embedded")]
    embedded: Option<serde_json::Value>,
    status: Option<serde_json::Value>,
    title: Option<serde_json::Value>,
    detail: Option<serde_json::Value>,
}

impl EventBatch {
    fn is_unauthorized(&self) -> bool {
        match &self.status {
            Some(serde_json::Value::Number(n)) => n.as_u64() == Some(401),
            Some(serde_json::Value::String(s)) => s == "401",
            _ => false,
        }
    }

    fn problem_detail(&self) -> String {
        [&self.detail, &self.title]
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "no detail".to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatedRecord {
    /// Unix timestamp in seconds, with fraction.
    pub date: f64,
    pub events: serde_json::Value,
}

impl DatedRecord {
    pub fn new<Tz: TimeZone>(events: serde_json::Value, now: &DateTime<Tz>) -> DatedRecord {
        DatedRecord {
            date: now.timestamp_micros() as f64 / 1_000_000.0,
            events,
        }
    }

    /// The calendar day `date` falls on in `tz`, or `None` if the timestamp
    /// is out of range.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        if !self.date.is_finite() {
            return None;
        }
        let secs = self.date.floor();
        let nanos = ((self.date - secs) * 1_000_000_000.0) as u32;
        DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
            .map(|utc| utc.with_timezone(tz).date_naive())
    }
}

/// Builds the serialized record for `events` stamped with the current time.
pub fn build_record(events: &str) -> Result<String, RecordError> {
    build_record_at(events, &Local::now())
}

pub fn build_record_at<Tz: TimeZone>(
    events: &str,
    now: &DateTime<Tz>,
) -> Result<String, RecordError> {
    if events.trim().is_empty() {
        return Err(RecordError::EmptyFeed);
    }
    let mut batch: EventBatch = serde_json::from_str(events).map_err(RecordError::Malformed)?;

    // A null `_embedded` counts as absent.
    let embedded = match batch.embedded.take() {
        Some(embedded) => embedded,
        None if batch.is_unauthorized() => {
            return Err(RecordError::Unauthorized {
                detail: batch.problem_detail(),
            })
        }
        None => return Err(RecordError::MissingEmbedded),
    };

    serde_json::to_string(&DatedRecord::new(embedded, now)).map_err(RecordError::Malformed)
}
