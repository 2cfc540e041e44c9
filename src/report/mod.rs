//! Report retrieval
//!
//! Everything between a report id and the numbers on the dashboard:
//!
//! - **shape**: recognizing the wrappers the storage service uses
//! - **client**: HTTP client for the storage service
//! - **session**: the load cycle (demo, loading, loaded, no data, failed)
//! - **view**: stat cards and chart series bound by the dashboard
//! - **route**: extracting report ids from dashboard links

mod client;
mod route;
mod session;
mod shape;
mod view;

pub use client::{status_error, ReportClient, ReportClientConfig, DEFAULT_REPORT_URL};
pub use route::{resolve_report_id, Route};
pub use session::{Completion, DashboardState, LoadOutcome, LoadTicket, ReportSession, NO_DATA_MESSAGE};
pub use shape::{DocumentShape, ReportDocument, ShapeError};
pub use view::{
    format_count, format_hours, ActivityBar, CategorySlice, DashboardView, StatCards, ViewMode,
};

use async_trait::async_trait;
use thiserror::Error;

/// Anything that can produce report documents by id
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Human-readable identifier for logs and health output
    fn name(&self) -> &str;

    /// Retrieve one report
    async fn fetch(&self, report_id: &str) -> ReportResult<ReportDocument>;
}

/// Errors retrieving a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Report service returned status {status}")]
    Status { status: u16 },

    #[error("Report service unavailable")]
    Unavailable,

    #[error("Request timeout")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid report document: {0}")]
    Malformed(#[from] ShapeError),

    #[error("Invalid report id: {0:?}")]
    InvalidId(String),
}

/// Coarse failure classes shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Connection,
    Upstream,
    Malformed,
}

impl ReportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReportError::NotFound(_) | ReportError::InvalidId(_) => FailureKind::NotFound,
            ReportError::Unavailable | ReportError::Timeout | ReportError::Request(_) => {
                FailureKind::Connection
            }
            ReportError::Status { .. } => FailureKind::Upstream,
            ReportError::Malformed(_) => FailureKind::Malformed,
        }
    }

    /// Text shown on the dashboard's error panel
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::NotFound => "Report not found",
            FailureKind::Upstream => "Failed to load report",
            FailureKind::Connection => "Could not connect to server.",
            FailureKind::Malformed => "Invalid data format received.",
        }
    }
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;
