//! Evaluation submission and result persistence for a completed interview.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::gateway::{Backend, GatewayError};
use crate::models::candidate::{CandidateEntry, CandidateStatus, HistoryItem, LastResult};
use crate::models::evaluation::{EvaluationRequest, EvaluationResponse};
use crate::models::interview::{ContactFields, UNANSWERED};
use crate::storage::candidates::CandidateStore;

pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

const DEFAULT_NAME: &str = "Candidate";

/// Everything needed to score and record one finished interview.
#[derive(Debug, Clone)]
pub struct FinalizeJob {
    pub request: EvaluationRequest,
    pub fields: ContactFields,
    pub resume_file_name: Option<String>,
    /// Session the job was produced for.
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum FinalizeOutcome {
    Saved(CandidateEntry),
    Failed(String),
}

/// Submits the evaluation, retrying any failure up to `MAX_ATTEMPTS` times
/// with a fixed delay between attempts.
pub async fn submit_with_retry(
    backend: &dyn Backend,
    request: &EvaluationRequest,
) -> Result<EvaluationResponse, GatewayError> {
    let mut attempt = 1;
    loop {
        match backend.submit_evaluation(request).await {
            Ok(response) => return Ok(response),
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "Evaluation attempt {attempt} failed, retrying after {}ms: {e}",
                    RETRY_DELAY.as_millis()
                );
                tokio::time::sleep(RETRY_DELAY).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Evaluation failed after {MAX_ATTEMPTS} attempts: {e}");
                return Err(e);
            }
        }
    }
}

/// Scores the interview and records the candidate and the last result.
/// Nothing is written unless the evaluation succeeds.
pub async fn finalize(
    backend: &dyn Backend,
    candidates: &CandidateStore,
    job: FinalizeJob,
) -> FinalizeOutcome {
    let response = match submit_with_retry(backend, &job.request).await {
        Ok(response) => response,
        Err(e) => return FinalizeOutcome::Failed(e.to_string()),
    };

    let candidate = build_candidate(&job, &response);
    if let Err(e) = candidates.upsert(candidate.clone()) {
        error!("Failed to save candidate {}: {e}", candidate.email);
        return FinalizeOutcome::Failed(e.to_string());
    }

    let last = LastResult {
        id: candidate.id.clone(),
        name: candidate.name.clone(),
        email: candidate.email.clone(),
        final_score: candidate.final_score,
        details: response,
        recorded_at: Utc::now(),
    };
    if let Err(e) = candidates.save_last_result(&last) {
        warn!("Failed to save last result: {e}");
    }

    info!(
        "Recorded candidate {} with score {}",
        candidate.email, candidate.final_score
    );
    FinalizeOutcome::Saved(candidate)
}

/// History comes from the evaluator's results. The submitted answer is used
/// when the evaluator does not echo it back; with neither, the answer is
/// recorded as unanswered.
pub fn build_candidate(job: &FinalizeJob, response: &EvaluationResponse) -> CandidateEntry {
    let non_blank = |a: &String| !a.trim().is_empty();
    let history = response
        .results
        .iter()
        .enumerate()
        .map(|(idx, result)| HistoryItem {
            question: result.question.clone(),
            answer: result
                .answer
                .clone()
                .filter(non_blank)
                .or_else(|| {
                    job.request
                        .answers
                        .get(idx)
                        .map(|a| a.answer.clone())
                        .filter(non_blank)
                })
                .unwrap_or_else(|| UNANSWERED.to_string()),
            difficulty: result.difficulty,
            ai_score: result.ai_score,
            ai_justification: result.ai_justification.clone(),
        })
        .collect();

    let name = match job.fields.name.trim() {
        "" => DEFAULT_NAME.to_string(),
        name => name.to_string(),
    };

    CandidateEntry {
        id: Uuid::new_v4().to_string(),
        name,
        email: job.fields.email.trim().to_string(),
        phone: job.fields.phone.trim().to_string(),
        resume_file_name: job.resume_file_name.clone(),
        final_score: response.total_score,
        status: CandidateStatus::Complete,
        history,
        summary: response.final_verdict.clone(),
        completed_at: Some(Utc::now()),
    }
}
