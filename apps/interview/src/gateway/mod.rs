//! Backend gateway — the only place that talks to the scoring backend.
//!
//! Every response is validated into a typed value at this boundary; callers
//! never see raw JSON.

pub mod http;
mod schema;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::evaluation::{EvaluationRequest, EvaluationResponse};
use crate::models::interview::{ContactFields, Question, ResumeFile};

/// Multipart field name the parse endpoint reads the file from.
pub const RESUME_FIELD: &str = "resume";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    Schema(String),
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Uploads the resume and returns whatever contact fields the parser found.
    async fn parse_resume(&self, file: &ResumeFile) -> Result<ContactFields, GatewayError>;

    /// Fetches the ordered question list for a new interview.
    async fn fetch_questions(&self) -> Result<Vec<Question>, GatewayError>;

    /// Single evaluation attempt. Retrying is the caller's concern.
    async fn submit_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, GatewayError>;
}
