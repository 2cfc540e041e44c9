//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use crate::history::{AggregateResult, CategoryRule};
use crate::report::DashboardView;

// ============================================
// REPORT DTOs
// ============================================

/// Response for a stored report
///
/// An empty report is a normal response with status "no_data".
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportResponse {
    Loaded {
        #[serde(rename = "reportId")]
        report_id: String,
        view: DashboardView,
        result: AggregateResult,
    },
    NoData {
        #[serde(rename = "reportId")]
        report_id: String,
        message: String,
    },
}

// ============================================
// AGGREGATE DTOs
// ============================================

/// Optional overrides for an aggregation request
#[derive(Debug, Default, Deserialize)]
pub struct AggregateQuery {
    /// Ranking length (1-100)
    #[serde(default)]
    pub top_n: Option<usize>,
    /// Minutes attributed to each visit (1-600)
    #[serde(default)]
    pub minutes_per_visit: Option<u32>,
}

// ============================================
// CATEGORY DTOs
// ============================================

/// Active category table
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryRule>,
    pub fallback: CategoryRule,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub report_source: String,
    pub uptime_seconds: u64,
    pub version: String,
}
