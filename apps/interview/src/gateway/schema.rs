//! Wire shapes returned by the backend and their validation into domain types.

use std::collections::HashSet;

use serde::Deserialize;

use super::GatewayError;
use crate::models::evaluation::{EvaluationResponse, EvaluationResult};
use crate::models::interview::{ContactFields, Difficulty, Question};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ParseResumeBody {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    resume_verdict: Option<String>,
}

impl ParseResumeBody {
    pub(super) fn into_fields(self) -> ContactFields {
        ContactFields {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            resume_verdict: self.resume_verdict.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct QuestionsBody {
    questions: Option<Vec<QuestionBody>>,
}

#[derive(Debug, Deserialize)]
struct QuestionBody {
    id: Option<i64>,
    question: Option<String>,
    difficulty: Option<Difficulty>,
}

impl QuestionsBody {
    pub(super) fn validate(self) -> Result<Vec<Question>, GatewayError> {
        let questions = self
            .questions
            .ok_or_else(|| GatewayError::Schema("missing 'questions'".to_string()))?;

        let mut seen = HashSet::new();
        questions
            .into_iter()
            .enumerate()
            .map(|(idx, q)| {
                let missing = |field: &str| {
                    GatewayError::Schema(format!("question #{} is missing '{field}'", idx + 1))
                };
                let id = q.id.ok_or_else(|| missing("id"))?;
                if !seen.insert(id) {
                    return Err(GatewayError::Schema(format!(
                        "question #{} repeats id {id}",
                        idx + 1
                    )));
                }
                let text = q.question.ok_or_else(|| missing("question"))?;
                if text.trim().is_empty() {
                    return Err(GatewayError::Schema(format!(
                        "question #{} has empty text",
                        idx + 1
                    )));
                }
                Ok(Question {
                    id,
                    question: text,
                    difficulty: q.difficulty.ok_or_else(|| missing("difficulty"))?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EvaluationBody {
    total_score: Option<f64>,
    results: Option<Vec<ResultBody>>,
    final_verdict: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultBody {
    question: Option<String>,
    answer: Option<String>,
    ai_score: Option<f64>,
    ai_justification: Option<String>,
    difficulty: Option<Difficulty>,
}

impl EvaluationBody {
    pub(super) fn validate(self) -> Result<EvaluationResponse, GatewayError> {
        let total = self
            .total_score
            .ok_or_else(|| GatewayError::Schema("missing 'totalScore'".to_string()))?;
        if !total.is_finite() || !(0.0..=100.0).contains(&total) {
            return Err(GatewayError::Schema(format!(
                "'totalScore' {total} is outside 0-100"
            )));
        }

        let results = self
            .results
            .ok_or_else(|| GatewayError::Schema("missing 'results'".to_string()))?
            .into_iter()
            .enumerate()
            .map(|(idx, r)| {
                let missing = |field: &str| {
                    GatewayError::Schema(format!("result #{} is missing '{field}'", idx + 1))
                };
                Ok(EvaluationResult {
                    question: r.question.ok_or_else(|| missing("question"))?,
                    answer: r.answer,
                    ai_score: r.ai_score.ok_or_else(|| missing("aiScore"))?,
                    ai_justification: r.ai_justification.unwrap_or_default(),
                    difficulty: r.difficulty.ok_or_else(|| missing("difficulty"))?,
                })
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        Ok(EvaluationResponse {
            total_score: total.round() as u32,
            results,
            final_verdict: self.final_verdict.unwrap_or_default(),
        })
    }
}
