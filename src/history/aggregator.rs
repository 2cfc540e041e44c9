//! History Aggregator
//!
//! Turns a list of history entries into the dashboard statistics:
//! totals, estimated screen time, top domains, category breakdown and a
//! Monday-first weekly activity histogram.
//!
//! Aggregation is a single synchronous pass. It never fails: malformed
//! fields are defaulted during normalization.

use chrono::{DateTime, Datelike, FixedOffset, Local, Offset, Utc, Weekday};
use indexmap::IndexMap;
use serde::Serialize;

use super::category::{CategoryRule, CategoryTable};
use super::entry::{HistoryEntry, RawEntry};

/// Number of domains kept in the ranking by default
pub const DEFAULT_TOP_N: usize = 5;

/// Heuristic screen time attributed to one visit
pub const ESTIMATED_MINUTES_PER_VISIT: u32 = 3;

/// Weekday labels in histogram order
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Time zone used to decide which weekday a visit falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekdayZone {
    /// The host's local time zone
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl WeekdayZone {
    pub fn utc() -> Self {
        WeekdayZone::Fixed(Utc.fix())
    }

    /// Parse "local", "utc" or an offset such as "+05:30"
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" => Some(WeekdayZone::Local),
            "utc" | "z" => Some(Self::utc()),
            other => other.parse::<FixedOffset>().ok().map(WeekdayZone::Fixed),
        }
    }

    /// Weekday of a millisecond timestamp in this zone
    pub fn weekday_of(&self, timestamp_ms: i64) -> Option<Weekday> {
        let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
        let weekday = match self {
            WeekdayZone::Local => utc.with_timezone(&Local).weekday(),
            WeekdayZone::Fixed(offset) => utc.with_timezone(offset).weekday(),
        };
        Some(weekday)
    }
}

/// Tunables for a single aggregation call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateOptions {
    pub top_n: usize,
    pub minutes_per_visit: u32,
    pub zone: WeekdayZone,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            minutes_per_visit: ESTIMATED_MINUTES_PER_VISIT,
            zone: WeekdayZone::Local,
        }
    }
}

impl AggregateOptions {
    /// Builder method: set ranking length
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Builder method: set minutes attributed to each visit
    pub fn minutes_per_visit(mut self, minutes: u32) -> Self {
        self.minutes_per_visit = minutes;
        self
    }

    /// Builder method: set weekday time zone
    pub fn zone(mut self, zone: WeekdayZone) -> Self {
        self.zone = zone;
        self
    }

    fn hours_for(&self, visits: u64) -> f64 {
        visits as f64 * self.minutes_per_visit as f64 / 60.0
    }
}

/// Visits summed for one domain
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainVisits {
    pub domain: String,
    pub visits: u64,
}

/// Visits summed for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryVisits {
    pub name: String,
    pub visits: u64,
    pub color: String,
}

/// Everything the dashboard derives from a report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub total_visits: u64,
    pub total_screen_time_hours: f64,
    /// Sorted by visits descending, ties in first-seen order
    pub top_domains: Vec<DomainVisits>,
    /// Sorted by visits descending, ties in first-seen order
    pub category_breakdown: Vec<CategoryVisits>,
    /// Monday first, Sunday last
    pub weekly_activity_hours: [f64; 7],
    pub most_visited: Option<String>,
    pub leakage_hours: f64,
}

impl AggregateResult {
    /// The zero-valued result of an empty report
    pub fn empty() -> Self {
        Self {
            total_visits: 0,
            total_screen_time_hours: 0.0,
            top_domains: Vec::new(),
            category_breakdown: Vec::new(),
            weekly_activity_hours: [0.0; 7],
            most_visited: None,
            leakage_hours: 0.0,
        }
    }

    /// Histogram buckets paired with their weekday labels
    pub fn weekly_activity(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        WEEKDAY_LABELS
            .iter()
            .copied()
            .zip(self.weekly_activity_hours.iter().copied())
    }

    /// Visits recorded for a category, 0 when absent
    pub fn category_visits(&self, name: &str) -> u64 {
        self.category_breakdown
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.visits)
            .unwrap_or(0)
    }
}

/// Normalize raw records and aggregate them
pub fn aggregate(
    entries: &[RawEntry],
    categories: &CategoryTable,
    options: &AggregateOptions,
) -> AggregateResult {
    let normalized: Vec<HistoryEntry> = entries.iter().map(HistoryEntry::normalize).collect();
    aggregate_entries(&normalized, categories, options)
}

/// Aggregate already-normalized entries
pub fn aggregate_entries(
    entries: &[HistoryEntry],
    categories: &CategoryTable,
    options: &AggregateOptions,
) -> AggregateResult {
    let mut total_visits: u64 = 0;
    let mut leakage_visits: u64 = 0;
    let mut domains: IndexMap<&str, u64> = IndexMap::new();
    let mut category_totals: IndexMap<&str, (&CategoryRule, u64)> = IndexMap::new();
    // Indexed by days from Sunday
    let mut day_hours = [0.0_f64; 7];
    let mut undated = 0usize;

    for entry in entries {
        let visits = entry.visit_count;
        total_visits = total_visits.saturating_add(visits);

        let domain_total = domains.entry(entry.domain.as_str()).or_insert(0);
        *domain_total = domain_total.saturating_add(visits);

        let rule = categories.classify(&entry.domain);
        let (_, category_total) = category_totals
            .entry(rule.name.as_str())
            .or_insert((rule, 0));
        *category_total = category_total.saturating_add(visits);
        if rule.leakage {
            leakage_visits = leakage_visits.saturating_add(visits);
        }

        match entry
            .last_visit_time
            .and_then(|ts| options.zone.weekday_of(ts))
        {
            Some(day) => {
                day_hours[day.num_days_from_sunday() as usize] += options.hours_for(visits);
            }
            None => undated += 1,
        }
    }

    let mut ranked: Vec<(&str, u64)> = domains.into_iter().collect();
    // Stable sort keeps first-seen order among ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let most_visited = ranked.first().map(|(domain, _)| domain.to_string());
    ranked.truncate(options.top_n);
    let top_domains: Vec<DomainVisits> = ranked
        .into_iter()
        .map(|(domain, visits)| DomainVisits {
            domain: domain.to_string(),
            visits,
        })
        .collect();

    let mut category_breakdown: Vec<CategoryVisits> = category_totals
        .into_values()
        .map(|(rule, visits)| CategoryVisits {
            name: rule.name.clone(),
            visits,
            color: rule.display_color().to_string(),
        })
        .collect();
    category_breakdown.sort_by(|a, b| b.visits.cmp(&a.visits));

    let weekly_activity_hours = std::array::from_fn(|i| round_tenth(day_hours[(i + 1) % 7]));

    if undated > 0 {
        tracing::debug!(undated, "Entries without a valid timestamp skipped in weekly histogram");
    }
    tracing::debug!(
        entries = entries.len(),
        total_visits,
        domains = top_domains.len(),
        categories = category_breakdown.len(),
        "Aggregated history"
    );

    AggregateResult {
        total_visits,
        total_screen_time_hours: round_tenth(options.hours_for(total_visits)),
        most_visited,
        top_domains,
        category_breakdown,
        weekly_activity_hours,
        leakage_hours: round_tenth(options.hours_for(leakage_visits)),
    }
}

/// Round to one decimal place
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
