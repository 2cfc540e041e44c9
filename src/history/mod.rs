//! History analytics
//!
//! The computational core of Cloudburst: normalizing uploaded
//! browsing-history records and aggregating them into dashboard statistics.
//!
//! ## Flow
//!
//! 1. `RawEntry` values arrive from a report document
//! 2. `HistoryEntry::normalize` defaults malformed fields
//! 3. `aggregate` classifies domains against a `CategoryTable` and
//!    produces an `AggregateResult`

mod aggregator;
mod category;
mod entry;

pub use aggregator::{
    aggregate, aggregate_entries, round_tenth, AggregateOptions, AggregateResult, CategoryVisits,
    DomainVisits, WeekdayZone, DEFAULT_TOP_N, ESTIMATED_MINUTES_PER_VISIT, WEEKDAY_LABELS,
};
pub use category::{CategoryRule, CategoryTable, OTHER_CATEGORY, OTHER_COLOR};
pub use entry::{
    coerce_timestamp, coerce_visit_count, HistoryEntry, RawEntry, UNKNOWN_DOMAIN, UNTITLED,
};
