//! History entry types
//!
//! Defines the two shapes a browsing-history record takes:
//! - `RawEntry`: the record as received, every field optional and untyped
//! - `HistoryEntry`: the normalized record the aggregator works on

use chrono::DateTime;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Domain used when neither `domain` nor a parsable `url` host is present
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Title used when a record carries none
pub const UNTITLED: &str = "Untitled";

const VISIT_COUNT_KEYS: &[&str] = &["visitCount", "visit_count", "visits"];
const LAST_VISIT_KEYS: &[&str] = &["lastVisitTime", "last_visit_time", "lastVisit"];

/// A browsing-history record exactly as it arrived
///
/// Fields keep their raw JSON values so that malformed input is defaulted
/// during normalization instead of being rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawEntry {
    pub url: Option<Value>,
    pub title: Option<Value>,
    pub domain: Option<Value>,
    pub visit_count: Option<Value>,
    pub last_visit_time: Option<Value>,
}

impl RawEntry {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a record from a JSON object, taking the first known spelling of each field
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let first_of = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| object.get(*key).filter(|v| !v.is_null()))
                .cloned()
        };

        Self {
            url: first_of(&["url"]),
            title: first_of(&["title"]),
            domain: first_of(&["domain"]),
            visit_count: first_of(VISIT_COUNT_KEYS),
            last_visit_time: first_of(LAST_VISIT_KEYS),
        }
    }

    /// Builder method: set url
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(Value::String(url.into()));
        self
    }

    /// Builder method: set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(Value::String(title.into()));
        self
    }

    /// Builder method: set domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(Value::String(domain.into()));
        self
    }

    /// Builder method: set visit count from any JSON value
    pub fn visit_count(mut self, count: impl Into<Value>) -> Self {
        self.visit_count = Some(count.into());
        self
    }

    /// Builder method: set last visit time from any JSON value
    pub fn last_visit_time(mut self, time: impl Into<Value>) -> Self {
        self.last_visit_time = Some(time.into());
        self
    }
}

impl From<Value> for RawEntry {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self::from_object(&object),
            _ => Self::default(),
        }
    }
}

/// A normalized browsing-history record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    /// Never empty; `UNKNOWN_DOMAIN` when nothing better is available
    pub domain: String,
    /// Always >= 1
    pub visit_count: u64,
    /// Unix timestamp in milliseconds, `None` when missing or invalid
    pub last_visit_time: Option<i64>,
}

impl HistoryEntry {
    /// Normalize a raw record, defaulting every malformed field
    pub fn normalize(raw: &RawEntry) -> Self {
        let url = non_empty_string(raw.url.as_ref()).unwrap_or_default();
        let title = non_empty_string(raw.title.as_ref()).unwrap_or_else(|| UNTITLED.to_string());
        let domain = non_empty_string(raw.domain.as_ref())
            .or_else(|| host_of(&url))
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string());

        Self {
            url,
            title,
            domain,
            visit_count: coerce_visit_count(raw.visit_count.as_ref()),
            last_visit_time: coerce_timestamp(raw.last_visit_time.as_ref()),
        }
    }
}

impl From<&RawEntry> for HistoryEntry {
    fn from(raw: &RawEntry) -> Self {
        Self::normalize(raw)
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn host_of(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

/// Coerce a visit count to a positive integer
///
/// Integers, finite floats (truncated) and numeric strings are accepted.
/// Everything else, and anything below 1, counts as a single visit.
pub fn coerce_visit_count(value: Option<&Value>) -> u64 {
    let count = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().and_then(float_count)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_count))
        }
        _ => None,
    };

    count.unwrap_or(1).max(1)
}

fn float_count(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    // Saturating cast
    Some(value.trunc() as u64)
}

/// Coerce a last-visit time to milliseconds since epoch
///
/// Accepts numbers, numeric strings and RFC 3339 strings. Zero and values
/// outside the representable date range are treated as missing.
pub fn coerce_timestamp(value: Option<&Value>) -> Option<i64> {
    let millis = match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .or_else(|| {
                    DateTime::parse_from_rfc3339(s)
                        .ok()
                        .map(|dt| dt.timestamp_millis())
                })
        }
        _ => None,
    }?;

    if millis == 0 || DateTime::from_timestamp_millis(millis).is_none() {
        return None;
    }
    Some(millis)
}
