use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::dashboard::detail::CandidateDetail;
use crate::dashboard::{build_page, DashboardPage, SortDir, SortKey};
use crate::errors::AppError;
use crate::models::candidate::LastResult;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageNav {
    Next,
    Previous,
}

/// All parameters are optional; anything omitted keeps the current setting.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub search: Option<String>,
    pub sort: Option<SortKey>,
    pub dir: Option<SortDir>,
    pub page: Option<usize>,
    pub toggle: Option<SortKey>,
    pub nav: Option<PageNav>,
}

/// GET /api/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Json<DashboardPage> {
    let mut query = state.dashboard.lock().await;

    if let Some(search) = &params.search {
        query.set_search(search);
    }
    if params.sort.is_some() || params.dir.is_some() {
        let sort = params.sort.unwrap_or(query.sort);
        let dir = params.dir.unwrap_or(query.dir);
        query.set_sort(sort, dir);
    }
    if let Some(key) = params.toggle {
        query.toggle_sort(key);
    }
    if let Some(page) = params.page {
        query.page = page;
    }
    match params.nav {
        Some(PageNav::Next) => query.next_page(),
        Some(PageNav::Previous) => query.previous_page(),
        None => {}
    }

    let page = build_page(&state.candidates.list(), &query);
    query.page = page.query.page;
    Json(page)
}

/// GET /api/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CandidateDetail>, AppError> {
    let candidate = state
        .candidates
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    Ok(Json(CandidateDetail::from(candidate)))
}

/// GET /api/results/latest
pub async fn handle_latest_result(
    State(state): State<AppState>,
) -> Result<Json<LastResult>, AppError> {
    let result = state
        .candidates
        .last_result()
        .ok_or_else(|| AppError::NotFound("No interview result recorded yet".to_string()))?;
    Ok(Json(result))
}
