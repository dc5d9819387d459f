use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::gateway::RESUME_FIELD;
use crate::interview::service::Submitted;
use crate::interview::view::InterviewView;
use crate::models::interview::{ContactFields, ResumeFile};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ViewQuery {
    pub draft: Option<String>,
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

/// GET /api/interview
pub async fn handle_get_view(
    State(state): State<AppState>,
    Query(params): Query<ViewQuery>,
) -> Json<InterviewView> {
    Json(state.interview.view(params.draft.as_deref()).await)
}

/// POST /api/interview/resume-file
/// Multipart upload; the file is read from the `resume` field.
pub async fn handle_select_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<InterviewView>, AppError> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read resume upload: {e}")))?;
        file = Some(ResumeFile {
            file_name,
            content_type,
            bytes,
        });
    }

    let file = file.ok_or_else(|| {
        AppError::Validation(format!("Missing multipart field '{RESUME_FIELD}'"))
    })?;
    state.interview.select_resume(file).await?;
    Ok(Json(state.interview.view(None).await))
}

/// POST /api/interview/parse
pub async fn handle_parse_resume(
    State(state): State<AppState>,
) -> Result<Json<InterviewView>, AppError> {
    state.interview.parse_resume().await?;
    Ok(Json(state.interview.view(None).await))
}

/// PUT /api/interview/fields
pub async fn handle_update_fields(
    State(state): State<AppState>,
    Json(fields): Json<ContactFields>,
) -> Result<Json<InterviewView>, AppError> {
    state.interview.update_fields(fields).await?;
    Ok(Json(state.interview.view(None).await))
}

/// POST /api/interview/confirm
pub async fn handle_confirm_fields(
    State(state): State<AppState>,
    Json(fields): Json<ContactFields>,
) -> Result<Json<InterviewView>, AppError> {
    state.interview.confirm_fields(fields).await?;
    Ok(Json(state.interview.view(None).await))
}

/// POST /api/interview/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<InterviewView>, AppError> {
    // Finalization runs in the background; its outcome shows up in a later view
    if let Submitted::Finalizing(_) = state.interview.submit_answer(&req.answer).await? {
        debug!("Interview finalization started");
    }
    Ok(Json(state.interview.view(None).await))
}

/// POST /api/interview/session/resume
pub async fn handle_resume_session(
    State(state): State<AppState>,
) -> Result<Json<InterviewView>, AppError> {
    if state.interview.resume_session().await.is_none() {
        return Err(AppError::NotFound(
            "No unfinished interview session to resume".to_string(),
        ));
    }
    Ok(Json(state.interview.view(None).await))
}

/// POST /api/interview/session/new
pub async fn handle_start_new(
    State(state): State<AppState>,
) -> Result<Json<InterviewView>, AppError> {
    state.interview.start_new().await?;
    Ok(Json(state.interview.view(None).await))
}
