//! # Cloudburst
//!
//! Browsing-history analytics. The browser extension uploads a user's
//! history to the report storage service; Cloudburst fetches a stored
//! report and turns it into the numbers behind the dashboard.
//!
//! ## Features
//!
//! - **Aggregation**: visit totals, estimated screen time, top domains,
//!   category breakdown and a weekly activity histogram
//! - **Tolerant input**: malformed fields are defaulted, never rejected
//! - **Report retrieval**: strict document-shape recognition with clear
//!   not-found / no-data / failure outcomes
//! - **Dashboard API**: REST endpoints for reports, ad-hoc aggregation and
//!   demo data
//!
//! ## Modules
//!
//! - [`history`]: Entry normalization, categorization and aggregation
//! - [`report`]: Report retrieval, load sessions and dashboard views
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use cloudburst::history::*;
//!
//! let entries = vec![
//!     RawEntry::new().domain("youtube.com").visit_count(10),
//!     RawEntry::new().url("https://docs.google.com/document/d/1"),
//! ];
//!
//! let result = aggregate(&entries, &CategoryTable::builtin(), &AggregateOptions::default());
//!
//! assert_eq!(result.total_visits, 11);
//! assert_eq!(result.most_visited.as_deref(), Some("youtube.com"));
//! assert_eq!(result.category_visits("Productivity"), 1);
//! ```

pub mod api;
pub mod config;
pub mod history;
pub mod report;

// Re-export top-level types for convenience
pub use history::{
    aggregate, AggregateOptions, AggregateResult, CategoryRule, CategoryTable, HistoryEntry,
    RawEntry, WeekdayZone,
};

pub use report::{
    DashboardState, DashboardView, ReportClient, ReportClientConfig, ReportDocument, ReportError,
    ReportResult, ReportSession, ReportSource, ShapeError,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
