//! Report load session
//!
//! Tracks the dashboard through one report-load cycle:
//!
//! ```text
//! Demo --begin(id)--> Loading --complete--> Loaded | NoData | Failed
//! ```
//!
//! Every `begin` issues a `LoadTicket`. A completion is applied only if
//! its ticket belongs to the most recent `begin`, so a slow response for
//! an old report can never overwrite a newer one.

use std::sync::Arc;

use crate::history::{aggregate, AggregateOptions, AggregateResult, CategoryTable, RawEntry};

use super::view::DashboardView;
use super::{FailureKind, ReportDocument, ReportError, ReportResult, ReportSource};

/// Message shown when a report exists but holds no entries
pub const NO_DATA_MESSAGE: &str = "Report found but contains no history data.";

/// Proof of a started load, tagged with the report it was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    report_id: String,
}

impl LoadTicket {
    pub fn report_id(&self) -> &str {
        &self.report_id
    }
}

/// What a retrieval produced
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Vec<RawEntry>),
    NoData,
    Failed(ReportError),
}

impl LoadOutcome {
    /// Classify a fetch result, separating empty reports from errors
    pub fn from_fetch(result: ReportResult<ReportDocument>) -> Self {
        match result {
            Ok(document) if document.is_empty() => LoadOutcome::NoData,
            Ok(document) => LoadOutcome::Loaded(document.entries),
            Err(e) => LoadOutcome::Failed(e),
        }
    }
}

/// Where the dashboard currently is
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Demo,
    Loading {
        report_id: String,
    },
    Loaded {
        report_id: String,
        result: AggregateResult,
    },
    NoData {
        report_id: String,
    },
    Failed {
        report_id: String,
        kind: FailureKind,
        message: String,
    },
}

impl DashboardState {
    pub fn name(&self) -> &'static str {
        match self {
            DashboardState::Demo => "demo",
            DashboardState::Loading { .. } => "loading",
            DashboardState::Loaded { .. } => "loaded",
            DashboardState::NoData { .. } => "no_data",
            DashboardState::Failed { .. } => "failed",
        }
    }
}

/// Result of handing an outcome to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The ticket was superseded and the outcome was dropped
    Stale,
}

/// Report-load state machine for one dashboard
pub struct ReportSession {
    categories: Arc<CategoryTable>,
    options: AggregateOptions,
    generation: u64,
    state: DashboardState,
}

impl ReportSession {
    /// Create a session showing demo data
    pub fn new(categories: Arc<CategoryTable>, options: AggregateOptions) -> Self {
        Self {
            categories,
            options,
            generation: 0,
            state: DashboardState::Demo,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// The report currently requested, if any
    pub fn active_report(&self) -> Option<&str> {
        match &self.state {
            DashboardState::Demo => None,
            DashboardState::Loading { report_id }
            | DashboardState::Loaded { report_id, .. }
            | DashboardState::NoData { report_id }
            | DashboardState::Failed { report_id, .. } => Some(report_id),
        }
    }

    /// Switch to a report (or back to demo data with `None`)
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin(&mut self, report_id: Option<&str>) -> Option<LoadTicket> {
        self.generation += 1;

        let report_id = report_id.map(str::trim).filter(|id| !id.is_empty());
        let Some(report_id) = report_id else {
            tracing::debug!("No report selected, showing demo data");
            self.state = DashboardState::Demo;
            return None;
        };

        tracing::debug!(report_id, generation = self.generation, "Report load started");
        self.state = DashboardState::Loading {
            report_id: report_id.to_string(),
        };
        Some(LoadTicket {
            generation: self.generation,
            report_id: report_id.to_string(),
        })
    }

    /// Apply a retrieval outcome if its ticket is still current
    pub fn complete(&mut self, ticket: LoadTicket, outcome: LoadOutcome) -> Completion {
        let current = ticket.generation == self.generation
            && matches!(&self.state, DashboardState::Loading { report_id } if *report_id == ticket.report_id);
        if !current {
            tracing::debug!(
                report_id = %ticket.report_id,
                active = ?self.active_report(),
                "Discarding stale report response"
            );
            return Completion::Stale;
        }

        let report_id = ticket.report_id;
        self.state = match outcome {
            LoadOutcome::Loaded(entries) => {
                let result = aggregate(&entries, &self.categories, &self.options);
                tracing::info!(
                    report_id = %report_id,
                    entries = entries.len(),
                    total_visits = result.total_visits,
                    "Report loaded"
                );
                DashboardState::Loaded { report_id, result }
            }
            LoadOutcome::NoData => {
                tracing::info!(report_id = %report_id, "Report contains no history data");
                DashboardState::NoData { report_id }
            }
            LoadOutcome::Failed(e) => {
                tracing::warn!(report_id = %report_id, error = %e, "Report load failed");
                DashboardState::Failed {
                    report_id,
                    kind: e.kind(),
                    message: e.user_message().to_string(),
                }
            }
        };
        Completion::Applied
    }

    /// Begin, fetch and complete in one step
    pub async fn load(&mut self, source: &dyn ReportSource, report_id: &str) -> &DashboardState {
        if let Some(ticket) = self.begin(Some(report_id)) {
            let outcome = LoadOutcome::from_fetch(source.fetch(ticket.report_id()).await);
            self.complete(ticket, outcome);
        }
        &self.state
    }

    /// The view to render, if the state has one
    pub fn view(&self) -> Option<DashboardView> {
        match &self.state {
            DashboardState::Demo => Some(DashboardView::demo()),
            DashboardState::Loaded { report_id, result } => {
                Some(DashboardView::live(report_id.clone(), result))
            }
            _ => None,
        }
    }

    /// Message for states that show one instead of charts
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            DashboardState::NoData { .. } => Some(NO_DATA_MESSAGE),
            DashboardState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
