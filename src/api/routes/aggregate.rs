//! Aggregate Route
//!
//! - POST /api/v1/aggregate - Aggregate a history document sent in the body
//!
//! The body may use any recognized report document shape.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::api::dto::AggregateQuery;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::history::{aggregate, AggregateOptions, AggregateResult};
use crate::report::ReportDocument;

const MAX_TOP_N: usize = 100;
const MAX_MINUTES_PER_VISIT: u32 = 600;

/// POST /api/v1/aggregate
///
/// Malformed query strings and bodies are reported in the usual error
/// envelope instead of axum's plain-text rejection.
pub async fn aggregate_document(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AggregateQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AggregateResult>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let Json(body) = body.map_err(|e| ApiError::Validation(e.body_text()))?;

    let options = options_for(&state.options, &query)?;
    let document = ReportDocument::from_value(&body)?;

    tracing::debug!(shape = %document.shape, entries = document.len(), "Aggregating posted document");

    Ok(Json(aggregate(&document.entries, &state.categories, &options)))
}

fn options_for(defaults: &AggregateOptions, query: &AggregateQuery) -> ApiResult<AggregateOptions> {
    let mut options = *defaults;

    if let Some(top_n) = query.top_n {
        if top_n == 0 || top_n > MAX_TOP_N {
            return Err(ApiError::Validation(format!(
                "top_n must be between 1 and {}",
                MAX_TOP_N
            )));
        }
        options = options.top_n(top_n);
    }

    if let Some(minutes) = query.minutes_per_visit {
        if minutes == 0 || minutes > MAX_MINUTES_PER_VISIT {
            return Err(ApiError::Validation(format!(
                "minutes_per_visit must be between 1 and {}",
                MAX_MINUTES_PER_VISIT
            )));
        }
        options = options.minutes_per_visit(minutes);
    }

    Ok(options)
}
