//! Interview flow state machine.
//!
//! Steps: UploadResume → ParsingResume → FieldsForm → GettingQuestions →
//! Interview → Completed. Network calls happen outside this type: each one is
//! split into a `begin_*` transition that hands out what the request needs and
//! a `finish_*` transition that applies the response. Every transition mirrors
//! the session into the `SessionStore`.
//!
//! `Completed` is terminal. Ticks are only honoured in `Interview`, so nothing
//! can auto-submit once the last answer is in.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::GatewayError;
use crate::interview::finalize::{FinalizeJob, FinalizeOutcome};
use crate::models::evaluation::{AnswerPayload, EvaluationRequest};
use crate::models::interview::{
    ChatMessage, ContactFields, InterviewSession, Question, RecordedAnswer, ResumeFile, Role,
    UNANSWERED,
};
use crate::storage::session::SessionStore;
use crate::storage::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowStep {
    UploadResume,
    ParsingResume,
    FieldsForm,
    GettingQuestions,
    Interview,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("No resume file selected")]
    NoResumeFile,

    #[error("Unsupported resume file '{0}': expected PDF, DOC or DOCX")]
    UnsupportedFile(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Answer cannot be empty")]
    EmptyAnswer,

    #[error("Cannot {action} while in step {step:?}")]
    InvalidStep {
        action: &'static str,
        step: FlowStep,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible notification, shown once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalizationStatus {
    Idle,
    Pending,
    Saved,
    Failed,
}

/// Result of submitting an answer.
#[derive(Debug)]
pub enum Advance {
    NextQuestion,
    Completed(Box<FinalizeJob>),
}

#[derive(Debug)]
pub enum Tick {
    /// Not interviewing; the timer should stop.
    Idle,
    Counting(u32),
    TimedOut(Advance),
}

pub struct InterviewFlow {
    sessions: SessionStore,
    allotment: u32,
    step: FlowStep,
    resume_file: Option<ResumeFile>,
    resume_file_name: Option<String>,
    fields: ContactFields,
    questions: Vec<Question>,
    current: usize,
    messages: Vec<ChatMessage>,
    answers: BTreeMap<i64, String>,
    time_left: u32,
    timed_out: bool,
    resume_offer: bool,
    finalization: FinalizationStatus,
    /// Bumped whenever the session is replaced, so late finalization results
    /// for an earlier session are dropped.
    generation: u64,
    notices: Vec<Notice>,
}

impl InterviewFlow {
    /// Starts at `UploadResume`. If an unfinished snapshot exists, the
    /// resume-or-start-new choice is offered.
    pub fn new(sessions: SessionStore, allotment: u32) -> Self {
        let resume_offer = sessions
            .load()
            .is_some_and(|session| !session.interview_completed);
        if resume_offer {
            info!("Found an unfinished interview session");
        }

        Self {
            sessions,
            allotment,
            step: FlowStep::UploadResume,
            resume_file: None,
            resume_file_name: None,
            fields: ContactFields::default(),
            questions: Vec::new(),
            current: 0,
            messages: Vec::new(),
            answers: BTreeMap::new(),
            time_left: allotment,
            timed_out: false,
            resume_offer,
            finalization: FinalizationStatus::Idle,
            generation: 0,
            notices: Vec::new(),
        }
    }

    // ── accessors ───────────────────────────────────────────────────────────

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.step {
            FlowStep::Interview => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn allotment(&self) -> u32 {
        self.allotment
    }

    /// Whether the previous question ended because its time ran out.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn resume_offer(&self) -> bool {
        self.resume_offer
    }

    pub fn resume_file_name(&self) -> Option<&str> {
        self.resume_file
            .as_ref()
            .map(|f| f.file_name.as_str())
            .or(self.resume_file_name.as_deref())
    }

    pub fn finalization(&self) -> FinalizationStatus {
        self.finalization
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ── upload and parse ────────────────────────────────────────────────────

    pub fn select_resume(&mut self, file: ResumeFile) -> Result<(), FlowError> {
        self.expect_step(FlowStep::UploadResume, "select a resume")?;
        if !file.is_supported() {
            return Err(FlowError::UnsupportedFile(file.file_name));
        }
        debug!("Selected resume '{}'", file.file_name);
        self.resume_file_name = Some(file.file_name.clone());
        self.resume_file = Some(file);
        Ok(())
    }

    /// Moves to `ParsingResume` and hands back the file to upload.
    pub fn begin_parse(&mut self) -> Result<ResumeFile, FlowError> {
        self.expect_step(FlowStep::UploadResume, "parse a resume")?;
        let file = self.resume_file.clone().ok_or(FlowError::NoResumeFile)?;
        self.step = FlowStep::ParsingResume;
        Ok(file)
    }

    /// Always lands in `FieldsForm`. A failed parse leaves the fields empty
    /// for manual entry.
    pub fn finish_parse(&mut self, result: Result<ContactFields, GatewayError>) {
        if self.step != FlowStep::ParsingResume {
            debug!("Ignoring parse result in step {:?}", self.step);
            return;
        }

        match result {
            Ok(fields) => {
                self.fields = fields;
                self.notify(NoticeLevel::Success, "Resume Parsed Successfully");
            }
            Err(e) => {
                warn!("Resume parsing failed, falling back to manual entry: {e}");
                self.fields = ContactFields::default();
                self.notify(NoticeLevel::Error, "AI Api is not Working");
            }
        }

        self.time_left = self.allotment;
        self.step = FlowStep::FieldsForm;
        self.persist();
    }

    // ── confirm and fetch questions ─────────────────────────────────────────

    pub fn update_fields(&mut self, fields: ContactFields) -> Result<(), FlowError> {
        self.expect_step(FlowStep::FieldsForm, "edit contact fields")?;
        self.fields = fields;
        self.persist();
        Ok(())
    }

    pub fn begin_confirm(&mut self, fields: ContactFields) -> Result<(), FlowError> {
        self.expect_step(FlowStep::FieldsForm, "confirm contact fields")?;
        let missing = fields.missing();
        if !missing.is_empty() {
            return Err(FlowError::MissingFields(missing));
        }
        self.fields = fields;
        self.step = FlowStep::GettingQuestions;
        self.persist();
        Ok(())
    }

    /// Returns `true` when the interview started. An empty list or a failed
    /// fetch goes back to the form.
    pub fn finish_questions(&mut self, result: Result<Vec<Question>, GatewayError>) -> bool {
        if self.step != FlowStep::GettingQuestions {
            debug!("Ignoring question list in step {:?}", self.step);
            return false;
        }

        let result = result.and_then(|questions| {
            let mut ids = BTreeSet::new();
            match questions.iter().find(|q| !ids.insert(q.id)) {
                Some(q) => Err(GatewayError::Schema(format!("repeated question id {}", q.id))),
                None => Ok(questions),
            }
        });

        let questions = match result {
            Ok(questions) if !questions.is_empty() => questions,
            Ok(_) => {
                warn!("Backend returned no interview questions");
                self.notify(
                    NoticeLevel::Error,
                    "No interview questions were returned. Please try again.",
                );
                self.step = FlowStep::FieldsForm;
                return false;
            }
            Err(e) => {
                warn!("Failed to fetch interview questions: {e}");
                self.notify(
                    NoticeLevel::Error,
                    "Failed to load interview questions. Please try again.",
                );
                self.step = FlowStep::FieldsForm;
                return false;
            }
        };

        info!("Starting interview with {} questions", questions.len());
        self.messages = vec![ChatMessage::ai(questions[0].question.clone())];
        self.questions = questions;
        self.current = 0;
        self.answers.clear();
        self.time_left = self.allotment;
        self.timed_out = false;
        self.step = FlowStep::Interview;
        self.persist();
        true
    }

    // ── answering ───────────────────────────────────────────────────────────

    pub fn submit_answer(&mut self, answer: &str) -> Result<Advance, FlowError> {
        self.expect_step(FlowStep::Interview, "submit an answer")?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(FlowError::EmptyAnswer);
        }
        self.timed_out = false;
        Ok(self.advance(answer.to_string()))
    }

    /// One second of the countdown. Reaching zero submits "Unanswered".
    pub fn tick(&mut self) -> Tick {
        if self.step != FlowStep::Interview {
            return Tick::Idle;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            self.persist();
            return Tick::Counting(self.time_left);
        }

        info!("Time ran out on question {}", self.current + 1);
        self.timed_out = true;
        Tick::TimedOut(self.advance(UNANSWERED.to_string()))
    }

    fn advance(&mut self, answer: String) -> Advance {
        let question_id = self.questions[self.current].id;
        self.messages.push(ChatMessage::user(answer.clone()));
        self.answers.insert(question_id, answer);

        let next = self.current + 1;
        if let Some(next_question) = self.questions.get(next) {
            self.messages
                .push(ChatMessage::ai(next_question.question.clone()));
            self.current = next;
            self.time_left = self.allotment;
            self.persist();
            return Advance::NextQuestion;
        }

        self.current = next;
        self.time_left = 0;
        self.step = FlowStep::Completed;
        self.finalization = FinalizationStatus::Pending;

        let mut snapshot = self.snapshot();
        snapshot.interview_completed = true;
        if let Err(e) = self.sessions.save(&snapshot) {
            warn!("Failed to persist completed session: {e}");
        }
        if let Err(e) = self.sessions.clear() {
            warn!("Failed to clear completed session: {e}");
        }

        info!("Interview completed, {} answers recorded", self.answers.len());
        Advance::Completed(Box::new(FinalizeJob {
            request: self.evaluation_request(),
            fields: self.fields.clone(),
            resume_file_name: self.resume_file_name().map(str::to_string),
            generation: self.generation,
        }))
    }

    /// Payload for the evaluator. Answers are looked up by question id; the
    /// transcript position is only a fallback for sessions restored without
    /// recorded answers.
    pub fn evaluation_request(&self) -> EvaluationRequest {
        let answers = self
            .questions
            .iter()
            .enumerate()
            .map(|(idx, q)| AnswerPayload {
                question_id: q.id,
                question: q.question.clone(),
                answer: self.answer_for(idx, q),
                difficulty: q.difficulty,
            })
            .collect();

        EvaluationRequest {
            resume_verdict: self.fields.resume_verdict.clone(),
            answers,
        }
    }

    fn answer_for(&self, idx: usize, question: &Question) -> String {
        if let Some(answer) = self.answers.get(&question.id) {
            return answer.clone();
        }
        self.messages
            .get(2 * idx + 1)
            .filter(|m| m.role == Role::User && !m.text.trim().is_empty())
            .map(|m| m.text.clone())
            .unwrap_or_else(|| UNANSWERED.to_string())
    }

    /// Applies a finalization result produced for session `generation`.
    pub fn record_finalization(&mut self, generation: u64, outcome: &FinalizeOutcome) {
        if generation != self.generation || self.finalization != FinalizationStatus::Pending {
            debug!("Dropping finalization result for a replaced session");
            return;
        }
        match outcome {
            FinalizeOutcome::Saved(candidate) => {
                self.finalization = FinalizationStatus::Saved;
                self.notify(
                    NoticeLevel::Success,
                    format!("Interview evaluated: {}/100", candidate.final_score),
                );
            }
            FinalizeOutcome::Failed(reason) => {
                warn!("Interview finalization failed: {reason}");
                self.finalization = FinalizationStatus::Failed;
                self.notify(
                    NoticeLevel::Error,
                    "Failed to finalize interview. Please try again.",
                );
            }
        }
    }

    // ── resume / start new ──────────────────────────────────────────────────

    /// Restores the stored snapshot. Returns `false` when there was nothing
    /// usable to restore.
    pub fn resume_session(&mut self) -> bool {
        self.resume_offer = false;
        self.generation += 1;

        let session = match self.sessions.load() {
            Some(session) if !session.interview_completed => session,
            _ => return false,
        };

        if !session.questions.is_empty() && session.current_question_index >= session.questions.len()
        {
            warn!(
                "Stored session index {} is out of range for {} questions, discarding",
                session.current_question_index,
                session.questions.len()
            );
            if let Err(e) = self.start_new() {
                warn!("Failed to discard unusable session: {e}");
            }
            return false;
        }
        if !session.questions.is_empty() && !session.transcript_matches_index() {
            warn!(
                "Stored transcript has {} messages for question index {}",
                session.messages.len(),
                session.current_question_index
            );
        }

        self.time_left = if session.time_left > 0 {
            u32::try_from(session.time_left)
                .unwrap_or(self.allotment)
                .min(self.allotment)
        } else {
            self.allotment
        };
        self.timed_out = false;
        self.fields = session.fields;
        self.questions = session.questions;
        self.current = session.current_question_index;
        self.messages = session.messages;
        self.answers = session
            .answers
            .into_iter()
            .map(|a| (a.question_id, a.answer))
            .collect();
        self.resume_file = None;
        self.resume_file_name = session.resume_file_name;
        self.finalization = FinalizationStatus::Idle;
        self.step = if self.questions.is_empty() {
            FlowStep::FieldsForm
        } else {
            FlowStep::Interview
        };

        info!("Resumed interview session at step {:?}", self.step);
        true
    }

    /// Discards the stored snapshot and resets every piece of state. The
    /// in-memory reset happens even if clearing storage fails.
    pub fn start_new(&mut self) -> Result<(), StorageError> {
        self.step = FlowStep::UploadResume;
        self.resume_file = None;
        self.resume_file_name = None;
        self.fields = ContactFields::default();
        self.questions.clear();
        self.current = 0;
        self.messages.clear();
        self.answers.clear();
        self.time_left = self.allotment;
        self.timed_out = false;
        self.resume_offer = false;
        self.finalization = FinalizationStatus::Idle;
        self.generation += 1;
        self.notices.clear();

        info!("Starting a new interview");
        self.sessions.clear()
    }

    // ── internals ───────────────────────────────────────────────────────────

    fn expect_step(&self, expected: FlowStep, action: &'static str) -> Result<(), FlowError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidStep {
                action,
                step: self.step,
            })
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    fn snapshot(&self) -> InterviewSession {
        InterviewSession {
            fields: self.fields.clone(),
            questions: self.questions.clone(),
            current_question_index: self.current,
            messages: self.messages.clone(),
            answers: self
                .answers
                .iter()
                .map(|(&question_id, answer)| RecordedAnswer {
                    question_id,
                    answer: answer.clone(),
                })
                .collect(),
            time_left: i64::from(self.time_left),
            interview_completed: self.step == FlowStep::Completed,
            resume_file_name: self.resume_file_name().map(str::to_string),
        }
    }

    /// A failed write is logged; it never blocks the flow.
    fn persist(&self) {
        if let Err(e) = self.sessions.save(&self.snapshot()) {
            warn!("Failed to persist interview session: {e}");
        }
    }
}
