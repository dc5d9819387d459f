use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::candidate::{CandidateEntry, CandidateStatus, HistoryItem};
use crate::models::interview::Difficulty;

/// Read-only view of one candidate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDetail {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_file_name: Option<String>,
    pub status: CandidateStatus,
    pub final_score: u32,
    pub history: Vec<HistoryView>,
    pub summary: String,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    /// e.g. `Q1 - Easy`
    pub label: String,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub ai_score: f64,
    pub max_score: u32,
    pub ai_justification: String,
}

impl HistoryView {
    fn new(position: usize, item: &HistoryItem) -> Self {
        Self {
            label: format!("Q{} - {}", position + 1, item.difficulty),
            question: item.question.clone(),
            answer: item.answer.clone(),
            difficulty: item.difficulty,
            ai_score: item.ai_score,
            max_score: item.difficulty.max_score(),
            ai_justification: item.ai_justification.clone(),
        }
    }
}

impl From<CandidateEntry> for CandidateDetail {
    fn from(c: CandidateEntry) -> Self {
        let history = c
            .history
            .iter()
            .enumerate()
            .map(|(idx, item)| HistoryView::new(idx, item))
            .collect();

        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            resume_file_name: c.resume_file_name,
            status: c.status,
            final_score: c.final_score,
            history,
            summary: c.summary,
            completed_at: c.completed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_labels_and_max_scores() {
        let entry = CandidateEntry {
            id: "c1".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@x.com".to_string(),
            phone: "555-1111".to_string(),
            resume_file_name: Some("resume.pdf".to_string()),
            final_score: 81,
            status: CandidateStatus::Complete,
            history: vec![
                HistoryItem {
                    question: "Q1".to_string(),
                    answer: "A1".to_string(),
                    difficulty: Difficulty::Easy,
                    ai_score: 8.0,
                    ai_justification: "Clear".to_string(),
                },
                HistoryItem {
                    question: "Q2".to_string(),
                    answer: "A2".to_string(),
                    difficulty: Difficulty::Hard,
                    ai_score: 20.0,
                    ai_justification: "Thorough".to_string(),
                },
            ],
            summary: "Hire".to_string(),
            completed_at: None,
        };

        let detail = CandidateDetail::from(entry);

        assert_eq!(detail.history[0].label, "Q1 - Easy");
        assert_eq!(detail.history[0].max_score, 10);
        assert_eq!(detail.history[1].label, "Q2 - Hard");
        assert_eq!(detail.history[1].max_score, 25);
        assert_eq!(detail.resume_file_name.as_deref(), Some("resume.pdf"));
        assert_eq!(detail.summary, "Hire");
    }
}
