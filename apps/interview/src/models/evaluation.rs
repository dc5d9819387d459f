use serde::{Deserialize, Serialize};

use crate::models::interview::Difficulty;

/// One answered question as sent to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    pub question_id: i64,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
}

/// POST body for the evaluation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    pub resume_verdict: String,
    pub answers: Vec<AnswerPayload>,
}

/// Per-question feedback from the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    pub ai_score: f64,
    pub ai_justification: String,
    pub difficulty: Difficulty,
}

/// Validated evaluator response. `total_score` is always within 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub total_score: u32,
    pub results: Vec<EvaluationResult>,
    pub final_verdict: String,
}
