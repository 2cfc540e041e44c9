//! Category Routes
//!
//! - GET /api/v1/categories - The active category table, in match order

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::CategoriesResponse;
use crate::api::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state.categories.rules().to_vec(),
        fallback: state.categories.fallback().clone(),
    })
}
