use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::evaluation::EvaluationResponse;
use crate::models::interview::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Complete,
    #[serde(rename = "In Progress")]
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub ai_score: f64,
    pub ai_justification: String,
}

/// Scored record of one finished interview. Stored once, keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEntry {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
    pub final_score: u32,
    pub status: CandidateStatus,
    #[serde(default)]
    pub history: Vec<HistoryItem>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Convenience copy of the most recent evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastResult {
    pub id: String,
    pub name: String,
    pub email: String,
    pub final_score: u32,
    pub details: EvaluationResponse,
    pub recorded_at: DateTime<Utc>,
}
