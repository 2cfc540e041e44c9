//! Dashboard view models
//!
//! The values the dashboard binds to its widgets: three stat cards, the
//! category donut and the weekly bar chart. Built either from an
//! `AggregateResult` or from the built-in sample data.

use serde::Serialize;

use crate::history::{AggregateResult, WEEKDAY_LABELS};

/// Whether the dashboard shows sample or real data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Demo,
    Live,
}

/// Stat card texts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCards {
    /// e.g. "42.3 hrs"
    pub total_screen_time: String,
    pub most_visited: String,
    /// Thousands-separated visit count
    pub visits: String,
    /// e.g. "18.5 hrs"
    pub leakage: String,
}

/// One slice of the category donut
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: u64,
    pub color: String,
}

/// One bar of the weekly chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityBar {
    pub name: String,
    pub hours: f64,
}

/// Everything the dashboard renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub mode: ViewMode,
    pub report_id: Option<String>,
    pub headline: String,
    pub stats: StatCards,
    pub categories: Vec<CategorySlice>,
    pub activity: Vec<ActivityBar>,
}

impl DashboardView {
    /// Sample data shown before any report is opened
    pub fn demo() -> Self {
        let categories = [
            ("Social Media", 45, "#FF8C42"),
            ("Productivity", 30, "#3B82F6"),
            ("Entertainment", 15, "#10B981"),
            ("News", 10, "#8B5CF6"),
        ]
        .into_iter()
        .map(|(name, value, color)| CategorySlice {
            name: name.to_string(),
            value,
            color: color.to_string(),
        })
        .collect();

        let hours = [4.2, 6.5, 5.1, 3.8, 7.2, 8.5, 6.0];
        let activity = WEEKDAY_LABELS
            .iter()
            .zip(hours)
            .map(|(day, hours)| ActivityBar {
                name: day.to_string(),
                hours,
            })
            .collect();

        Self {
            mode: ViewMode::Demo,
            report_id: None,
            headline: "Your Digital Pulse".to_string(),
            stats: StatCards {
                total_screen_time: "42.3 hrs".to_string(),
                most_visited: "youtube.com".to_string(),
                visits: "142".to_string(),
                leakage: "18.5 hrs".to_string(),
            },
            categories,
            activity,
        }
    }

    /// View of a loaded report
    pub fn live(report_id: impl Into<String>, result: &AggregateResult) -> Self {
        Self {
            mode: ViewMode::Live,
            report_id: Some(report_id.into()),
            headline: "Analysis Complete".to_string(),
            stats: StatCards {
                total_screen_time: format_hours(result.total_screen_time_hours),
                most_visited: result
                    .most_visited
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
                visits: format_count(result.total_visits),
                leakage: format_hours(result.leakage_hours),
            },
            categories: result
                .category_breakdown
                .iter()
                .map(|c| CategorySlice {
                    name: c.name.clone(),
                    value: c.visits,
                    color: c.color.clone(),
                })
                .collect(),
            activity: result
                .weekly_activity()
                .map(|(day, hours)| ActivityBar {
                    name: day.to_string(),
                    hours,
                })
                .collect(),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.mode == ViewMode::Demo
    }
}

/// Format hours as "12.5 hrs"
pub fn format_hours(hours: f64) -> String {
    format!("{:.1} hrs", hours)
}

/// Format a count with comma thousands separators
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{aggregate, AggregateOptions, CategoryTable, RawEntry, WeekdayZone};

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(142), "142");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(0.5), "0.5 hrs");
        assert_eq!(format_hours(42.0), "42.0 hrs");
    }

    #[test]
    fn test_demo_view() {
        let view = DashboardView::demo();
        assert!(view.is_demo());
        assert_eq!(view.report_id, None);
        assert_eq!(view.activity.len(), 7);
        assert_eq!(view.activity[0].name, "Mon");
        assert_eq!(view.activity[6].name, "Sun");
        assert_eq!(view.stats.total_screen_time, "42.3 hrs");
        assert_eq!(view.categories.iter().map(|c| c.value).sum::<u64>(), 100);
    }

    #[test]
    fn test_live_view() {
        let entries = vec![
            RawEntry::new()
                .domain("youtube.com")
                .visit_count(1200)
                .last_visit_time(1_704_110_400_000_i64),
            RawEntry::new().domain("github.com").visit_count(40),
        ];
        let options = AggregateOptions::default().zone(WeekdayZone::utc());
        let result = aggregate(&entries, &CategoryTable::builtin(), &options);
        let view = DashboardView::live("r-1", &result);

        assert_eq!(view.mode, ViewMode::Live);
        assert_eq!(view.report_id.as_deref(), Some("r-1"));
        assert_eq!(view.stats.total_screen_time, "62.0 hrs");
        assert_eq!(view.stats.most_visited, "youtube.com");
        assert_eq!(view.stats.visits, "1,240");
        assert_eq!(view.stats.leakage, "60.0 hrs");
        assert_eq!(view.categories[0].name, "Social Media");
        assert_eq!(view.activity[0].hours, 60.0);
    }

    #[test]
    fn test_live_view_without_domains() {
        let view = DashboardView::live("r-2", &AggregateResult::empty());
        assert_eq!(view.stats.most_visited, "N/A");
        assert_eq!(view.stats.visits, "0");
        assert!(view.categories.is_empty());
        assert_eq!(view.activity.len(), 7);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(DashboardView::demo()).unwrap();
        assert_eq!(value["mode"], "demo");
        assert!(value["stats"]["totalScreenTime"].is_string());
        assert!(value["reportId"].is_null());
    }
}
