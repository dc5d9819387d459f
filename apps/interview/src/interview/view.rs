use serde::Serialize;

use crate::interview::flow::{FinalizationStatus, FlowStep, InterviewFlow, Notice};
use crate::models::interview::{ChatMessage, ContactFields, Difficulty};

pub const TIME_UP_HINT: &str = "Time's up! The previous question was recorded as unanswered.";

/// Everything the browser needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewView {
    pub step: FlowStep,
    pub resume_offer: bool,
    pub resume_file_name: Option<String>,
    pub fields: ContactFields,
    pub missing_fields: Vec<&'static str>,
    pub can_confirm: bool,
    pub chat: Option<ChatView>,
    pub finalization: FinalizationStatus,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub progress: String,
    pub current_question: usize,
    pub total_questions: usize,
    pub difficulty: Difficulty,
    pub time_left: u32,
    /// Full allotment per question, for progress bars.
    pub time_allotted: u32,
    pub timer: String,
    pub time_up: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_up_hint: Option<&'static str>,
    pub can_send: bool,
    pub messages: Vec<ChatMessage>,
}

impl InterviewView {
    /// `draft` is the unsent answer text, used only to report whether it could
    /// be sent right now.
    pub fn build(flow: &InterviewFlow, notices: Vec<Notice>, draft: Option<&str>) -> Self {
        let missing_fields = match flow.step() {
            FlowStep::FieldsForm => flow.fields().missing(),
            _ => Vec::new(),
        };

        Self {
            step: flow.step(),
            resume_offer: flow.resume_offer(),
            resume_file_name: flow.resume_file_name().map(str::to_string),
            fields: flow.fields().clone(),
            can_confirm: flow.step() == FlowStep::FieldsForm && flow.fields().is_confirmable(),
            missing_fields,
            chat: ChatView::build(flow, draft.unwrap_or_default()),
            finalization: flow.finalization(),
            notices,
        }
    }
}

impl ChatView {
    fn build(flow: &InterviewFlow, draft: &str) -> Option<Self> {
        let question = flow.current_question()?;
        let current = flow.current_index() + 1;
        let total = flow.questions().len();
        let time_left = flow.time_left();
        let time_up = time_left == 0 || flow.timed_out();

        Some(Self {
            progress: progress_label(current, total, question.difficulty),
            current_question: current,
            total_questions: total,
            difficulty: question.difficulty,
            time_left,
            time_allotted: flow.allotment(),
            timer: format_timer(time_left),
            time_up,
            time_up_hint: time_up.then_some(TIME_UP_HINT),
            can_send: can_send(draft, time_left),
            messages: flow.messages().to_vec(),
        })
    }
}

pub fn progress_label(current: usize, total: usize, difficulty: Difficulty) -> String {
    format!("Question {current}/{total} — {difficulty}")
}

/// `MMm:SSs`, both parts zero-padded.
pub fn format_timer(secs: u32) -> String {
    format!("{:02}m:{:02}s", secs / 60, secs % 60)
}

pub fn can_send(draft: &str, time_left: u32) -> bool {
    !draft.trim().is_empty() && time_left > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::session::SessionStore;
    use crate::testing::{jane, pdf, two_questions};
    use std::sync::Arc;

    fn flow() -> InterviewFlow {
        InterviewFlow::new(SessionStore::new(Arc::new(MemoryStore::new())), 60)
    }

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(60), "01m:00s");
        assert_eq!(format_timer(59), "00m:59s");
        assert_eq!(format_timer(0), "00m:00s");
        assert_eq!(format_timer(605), "10m:05s");
    }

    #[test]
    fn test_can_send() {
        assert!(can_send("an answer", 10));
        assert!(!can_send("  ", 10));
        assert!(!can_send("an answer", 0));
    }

    #[test]
    fn test_upload_step_has_no_chat() {
        let view = InterviewView::build(&flow(), vec![], None);
        assert_eq!(view.step, FlowStep::UploadResume);
        assert!(view.chat.is_none());
        assert!(!view.can_confirm);
        assert!(view.missing_fields.is_empty());
    }

    #[test]
    fn test_fields_form_reports_missing() {
        let mut flow = flow();
        flow.select_resume(pdf("cv.pdf")).unwrap();
        flow.begin_parse().unwrap();
        flow.finish_parse(Ok(ContactFields {
            name: "Jane Doe".to_string(),
            ..Default::default()
        }));

        let view = InterviewView::build(&flow, vec![], None);
        assert_eq!(view.missing_fields, vec!["email", "phone"]);
        assert!(!view.can_confirm);
        assert_eq!(view.resume_file_name.as_deref(), Some("cv.pdf"));
    }

    #[test]
    fn test_chat_view_during_interview() {
        let mut flow = flow();
        flow.select_resume(pdf("cv.pdf")).unwrap();
        flow.begin_parse().unwrap();
        flow.finish_parse(Ok(jane()));
        flow.begin_confirm(jane()).unwrap();
        flow.finish_questions(Ok(two_questions()));
        flow.submit_answer("A1").unwrap();

        let view = InterviewView::build(&flow, vec![], Some("draft"));
        let chat = view.chat.unwrap();
        assert_eq!(chat.progress, "Question 2/2 — Hard");
        assert_eq!(chat.timer, "01m:00s");
        assert_eq!(chat.time_allotted, 60);
        assert!(chat.can_send);
        assert!(!chat.time_up);
        assert!(chat.time_up_hint.is_none());
        assert_eq!(chat.messages.len(), 3);
    }
}
