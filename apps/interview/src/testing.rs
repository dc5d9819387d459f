//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::gateway::{Backend, GatewayError};
use crate::interview::finalize::FinalizeJob;
use crate::models::evaluation::{
    AnswerPayload, EvaluationRequest, EvaluationResponse, EvaluationResult,
};
use crate::models::interview::{ContactFields, Difficulty, Question, ResumeFile};

pub fn jane() -> ContactFields {
    ContactFields {
        name: "Jane Doe".to_string(),
        email: "jane@x.com".to_string(),
        phone: "555-1111".to_string(),
        resume_verdict: "Strong".to_string(),
    }
}

pub fn pdf(name: &str) -> ResumeFile {
    ResumeFile {
        file_name: name.to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: Bytes::from_static(b"%PDF-1.4"),
    }
}

pub fn two_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            question: "Q1".to_string(),
            difficulty: Difficulty::Easy,
        },
        Question {
            id: 2,
            question: "Q2".to_string(),
            difficulty: Difficulty::Hard,
        },
    ]
}

pub fn sample_evaluation() -> EvaluationResponse {
    EvaluationResponse {
        total_score: 81,
        results: vec![
            EvaluationResult {
                question: "Q1".to_string(),
                answer: Some("A1".to_string()),
                ai_score: 8.0,
                ai_justification: "Clear".to_string(),
                difficulty: Difficulty::Easy,
            },
            EvaluationResult {
                question: "Q2".to_string(),
                answer: Some("A2".to_string()),
                ai_score: 20.0,
                ai_justification: "Thorough".to_string(),
                difficulty: Difficulty::Hard,
            },
        ],
        final_verdict: "Hire".to_string(),
    }
}

pub fn sample_job() -> FinalizeJob {
    FinalizeJob {
        request: EvaluationRequest {
            resume_verdict: "Strong".to_string(),
            answers: vec![
                AnswerPayload {
                    question_id: 1,
                    question: "Q1".to_string(),
                    answer: "A1".to_string(),
                    difficulty: Difficulty::Easy,
                },
                AnswerPayload {
                    question_id: 2,
                    question: "Q2".to_string(),
                    answer: "A2".to_string(),
                    difficulty: Difficulty::Hard,
                },
            ],
        },
        fields: jane(),
        resume_file_name: Some("resume.pdf".to_string()),
        generation: 0,
    }
}

fn unavailable() -> GatewayError {
    GatewayError::Status {
        status: 503,
        message: "unavailable".to_string(),
    }
}

/// Scripted backend. Succeeds with the sample data unless told otherwise.
pub struct FakeBackend {
    parsed: Option<ContactFields>,
    questions: Option<Vec<Question>>,
    evaluation: EvaluationResponse,
    evaluation_failures: AtomicU32,
    evaluation_attempts: AtomicU32,
    evaluation_requests: Mutex<Vec<EvaluationRequest>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            parsed: Some(jane()),
            questions: Some(two_questions()),
            evaluation: sample_evaluation(),
            evaluation_failures: AtomicU32::new(0),
            evaluation_attempts: AtomicU32::new(0),
            evaluation_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_parse(mut self) -> Self {
        self.parsed = None;
        self
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = Some(questions);
        self
    }

    pub fn failing_questions(mut self) -> Self {
        self.questions = None;
        self
    }

    /// The first `n` evaluation attempts fail.
    pub fn failing_evaluations(self, n: u32) -> Self {
        self.evaluation_failures.store(n, Ordering::SeqCst);
        self
    }

    pub fn evaluation_attempts(&self) -> u32 {
        self.evaluation_attempts.load(Ordering::SeqCst)
    }

    pub fn evaluation_requests(&self) -> Vec<EvaluationRequest> {
        self.evaluation_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn parse_resume(&self, _file: &ResumeFile) -> Result<ContactFields, GatewayError> {
        self.parsed.clone().ok_or_else(unavailable)
    }

    async fn fetch_questions(&self) -> Result<Vec<Question>, GatewayError> {
        self.questions.clone().ok_or_else(unavailable)
    }

    async fn submit_evaluation(
        &self,
        request: &EvaluationRequest,
    ) -> Result<EvaluationResponse, GatewayError> {
        self.evaluation_attempts.fetch_add(1, Ordering::SeqCst);
        self.evaluation_requests
            .lock()
            .unwrap()
            .push(request.clone());

        let failing = self
            .evaluation_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(unavailable());
        }
        Ok(self.evaluation.clone())
    }
}
