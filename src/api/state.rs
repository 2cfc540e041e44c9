//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::history::{AggregateOptions, CategoryTable};
use crate::report::ReportSource;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Where reports are fetched from
    pub reports: Arc<dyn ReportSource>,
    /// Category table used for every aggregation
    pub categories: Arc<CategoryTable>,
    /// Default aggregation options
    pub options: AggregateOptions,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState
    pub fn new(
        reports: Arc<dyn ReportSource>,
        categories: CategoryTable,
        options: AggregateOptions,
        config: ApiConfig,
    ) -> Self {
        Self {
            reports,
            categories: Arc::new(categories),
            options,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
