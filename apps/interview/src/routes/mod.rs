pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::dashboard::handlers as dashboard;
use crate::interview::handlers as interview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview flow
        .route("/api/interview", get(interview::handle_get_view))
        .route(
            "/api/interview/resume-file",
            post(interview::handle_select_resume),
        )
        .route("/api/interview/parse", post(interview::handle_parse_resume))
        .route("/api/interview/fields", put(interview::handle_update_fields))
        .route(
            "/api/interview/confirm",
            post(interview::handle_confirm_fields),
        )
        .route("/api/interview/answer", post(interview::handle_submit_answer))
        .route(
            "/api/interview/session/resume",
            post(interview::handle_resume_session),
        )
        .route(
            "/api/interview/session/new",
            post(interview::handle_start_new),
        )
        // Dashboard
        .route("/api/candidates", get(dashboard::handle_list_candidates))
        .route("/api/candidates/:id", get(dashboard::handle_get_candidate))
        .route("/api/results/latest", get(dashboard::handle_latest_result))
        .with_state(state)
}
