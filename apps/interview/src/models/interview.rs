use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Answer text recorded when the candidate never responded to a question.
pub const UNANSWERED: &str = "Unanswered";

/// Contact details parsed from the resume and confirmed by the candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_verdict: String,
}

impl ContactFields {
    /// Names of the required fields that are still blank.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    pub fn is_confirmable(&self) -> bool {
        self.missing().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy", alias = "EASY")]
    Easy,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "hard", alias = "HARD")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Highest score the evaluator awards for a question of this difficulty.
    pub fn max_score(&self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 15,
            Difficulty::Hard => 25,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ai,
    User,
}

/// One line of the interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn ai(text: impl Into<String>) -> Self {
        Self::new(Role::Ai, text.into())
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text.into())
    }

    fn new(role: Role, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedAnswer {
    pub question_id: i64,
    pub answer: String,
}

/// Persisted snapshot of an in-progress interview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    #[serde(default)]
    pub fields: ContactFields,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub current_question_index: usize,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub answers: Vec<RecordedAnswer>,
    /// Seconds left on the current question. Anything that is not a number
    /// reads back as zero.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub time_left: i64,
    #[serde(default)]
    pub interview_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_file_name: Option<String>,
}

impl InterviewSession {
    /// One AI message per posed question plus one user message per answer.
    pub fn transcript_matches_index(&self) -> bool {
        self.messages.len() == 2 * self.current_question_index + 1
    }
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// A resume selected for upload. Only the name and declared MIME type are
/// checked, never the content.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn is_supported(&self) -> bool {
        let by_mime = self.content_type.as_deref().is_some_and(|mime| {
            let mime = mime.to_ascii_lowercase();
            mime.contains("pdf") || mime.contains("msword") || mime.contains("wordprocessingml")
        });
        let by_extension = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| matches!(ext.to_ascii_lowercase().as_str(), "pdf" | "doc" | "docx"))
            .unwrap_or(false);
        by_mime || by_extension
    }
}
