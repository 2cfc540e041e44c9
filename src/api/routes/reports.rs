//! Report Routes
//!
//! - GET /api/v1/reports/:id - Fetch a stored report and aggregate it
//! - GET /api/v1/demo - Sample dashboard shown without a report

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::ReportResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::history::aggregate;
use crate::report::{DashboardView, NO_DATA_MESSAGE};

/// GET /api/v1/reports/:id
///
/// One upstream retrieval per request. Not-found and connectivity
/// failures map to distinct status codes.
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(report_id): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let document = state.reports.fetch(&report_id).await?;

    if document.is_empty() {
        tracing::info!(report_id = %report_id, "Report has no history entries");
        return Ok(Json(ReportResponse::NoData {
            report_id,
            message: NO_DATA_MESSAGE.to_string(),
        }));
    }

    let result = aggregate(&document.entries, &state.categories, &state.options);
    tracing::info!(
        report_id = %report_id,
        entries = document.len(),
        total_visits = result.total_visits,
        "Report aggregated"
    );

    Ok(Json(ReportResponse::Loaded {
        view: DashboardView::live(report_id.clone(), &result),
        report_id,
        result,
    }))
}

/// GET /api/v1/demo
pub async fn demo() -> Json<DashboardView> {
    Json(DashboardView::demo())
}
