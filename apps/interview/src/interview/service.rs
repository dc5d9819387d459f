//! Async driver around [`InterviewFlow`].
//!
//! Owns the flow behind a tokio mutex, the backend and the countdown. Backend
//! calls are made with the lock released so ticks keep landing while a request
//! is pending.

use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::gateway::Backend;
use crate::interview::finalize::{finalize, FinalizeJob};
use crate::interview::flow::{Advance, FlowError, FlowStep, InterviewFlow, Tick};
use crate::interview::timer::Countdown;
use crate::interview::view::InterviewView;
use crate::models::interview::{ContactFields, ResumeFile};
use crate::storage::candidates::CandidateStore;
use crate::storage::StorageError;

pub enum Submitted {
    NextQuestion,
    /// The last answer is in; the handle resolves once the result is recorded.
    Finalizing(JoinHandle<()>),
}

pub struct InterviewService {
    flow: Mutex<InterviewFlow>,
    backend: Arc<dyn Backend>,
    candidates: CandidateStore,
    timer: StdMutex<Countdown>,
}

impl InterviewService {
    pub fn new(
        flow: InterviewFlow,
        backend: Arc<dyn Backend>,
        candidates: CandidateStore,
    ) -> Arc<Self> {
        Arc::new(Self {
            flow: Mutex::new(flow),
            backend,
            candidates,
            timer: StdMutex::new(Countdown::new()),
        })
    }

    /// Current screen. Pending notices are handed out once.
    pub async fn view(&self, draft: Option<&str>) -> InterviewView {
        let mut flow = self.flow.lock().await;
        let notices = flow.drain_notices();
        InterviewView::build(&flow, notices, draft)
    }

    pub async fn select_resume(&self, file: ResumeFile) -> Result<(), FlowError> {
        self.flow.lock().await.select_resume(file)
    }

    pub async fn parse_resume(&self) -> Result<(), FlowError> {
        let file = self.flow.lock().await.begin_parse()?;
        info!("Parsing resume '{}' ({} bytes)", file.file_name, file.bytes.len());
        let result = self.backend.parse_resume(&file).await;
        self.flow.lock().await.finish_parse(result);
        Ok(())
    }

    pub async fn update_fields(&self, fields: ContactFields) -> Result<(), FlowError> {
        self.flow.lock().await.update_fields(fields)
    }

    /// Confirms the contact fields and loads the questions. Returns whether
    /// the interview started.
    pub async fn confirm_fields(self: &Arc<Self>, fields: ContactFields) -> Result<bool, FlowError> {
        self.flow.lock().await.begin_confirm(fields)?;
        let result = self.backend.fetch_questions().await;
        let started = self.flow.lock().await.finish_questions(result);
        if started {
            self.start_timer();
        }
        Ok(started)
    }

    pub async fn submit_answer(self: &Arc<Self>, answer: &str) -> Result<Submitted, FlowError> {
        let advance = self.flow.lock().await.submit_answer(answer)?;
        Ok(match advance {
            Advance::NextQuestion => {
                // Realign ticks with the fresh allotment
                self.start_timer();
                Submitted::NextQuestion
            }
            Advance::Completed(job) => {
                self.stop_timer();
                Submitted::Finalizing(self.spawn_finalization(*job))
            }
        })
    }

    /// Applies one countdown tick. Returns whether the countdown should keep
    /// running.
    pub async fn tick(self: &Arc<Self>) -> bool {
        let outcome = self.flow.lock().await.tick();
        match outcome {
            Tick::Idle => false,
            Tick::Counting(left) => {
                if left % 10 == 0 {
                    debug!("{left}s left on the current question");
                }
                true
            }
            Tick::TimedOut(Advance::NextQuestion) => true,
            Tick::TimedOut(Advance::Completed(job)) => {
                self.spawn_finalization(*job);
                false
            }
        }
    }

    /// Restores the stored session. Returns the step it landed on, or `None`
    /// when nothing could be restored.
    pub async fn resume_session(self: &Arc<Self>) -> Option<FlowStep> {
        let step = {
            let mut flow = self.flow.lock().await;
            if !flow.resume_session() {
                return None;
            }
            flow.step()
        };
        if step == FlowStep::Interview {
            self.start_timer();
        }
        Some(step)
    }

    pub async fn start_new(&self) -> Result<(), StorageError> {
        self.stop_timer();
        self.flow.lock().await.start_new()
    }

    fn start_timer(self: &Arc<Self>) {
        let service: Weak<Self> = Arc::downgrade(self);
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.start(move || {
            let service = service.clone();
            async move {
                match service.upgrade() {
                    Some(service) => service.tick().await,
                    None => false,
                }
            }
        });
        debug!("Countdown started");
    }

    fn stop_timer(&self) {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .stop();
    }

    fn spawn_finalization(self: &Arc<Self>, job: FinalizeJob) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.run_finalization(job).await })
    }

    async fn run_finalization(&self, job: FinalizeJob) {
        let generation = job.generation;
        let outcome = finalize(self.backend.as_ref(), &self.candidates, job).await;
        self.flow
            .lock()
            .await
            .record_finalization(generation, &outcome);
    }

    #[cfg(test)]
    fn timer_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::flow::{FinalizationStatus, NoticeLevel};
    use crate::models::interview::{Difficulty, Question, UNANSWERED};
    use crate::storage::memory::MemoryStore;
    use crate::storage::session::SessionStore;
    use crate::testing::{jane, pdf, FakeBackend};
    use std::time::Duration;

    const ALLOTMENT: u32 = 3;

    fn service(backend: FakeBackend) -> (Arc<InterviewService>, Arc<FakeBackend>, CandidateStore) {
        let kv = Arc::new(MemoryStore::new());
        let backend = Arc::new(backend);
        let candidates = CandidateStore::new(kv.clone());
        let flow = InterviewFlow::new(SessionStore::new(kv), ALLOTMENT);
        let service = InterviewService::new(flow, backend.clone(), candidates.clone());
        (service, backend, candidates)
    }

    async fn start_interview(service: &Arc<InterviewService>) {
        service.select_resume(pdf("resume.pdf")).await.unwrap();
        service.parse_resume().await.unwrap();
        assert!(service.confirm_fields(jane()).await.unwrap());
    }

    #[tokio::test]
    async fn test_full_interview_records_candidate() {
        let (service, backend, candidates) = service(FakeBackend::new());
        start_interview(&service).await;

        assert!(matches!(
            service.submit_answer("A1").await.unwrap(),
            Submitted::NextQuestion
        ));
        let handle = match service.submit_answer("A2").await.unwrap() {
            Submitted::Finalizing(handle) => handle,
            Submitted::NextQuestion => panic!("expected finalization"),
        };
        handle.await.unwrap();

        let requests = backend.evaluation_requests();
        assert_eq!(requests.len(), 1);
        let answers: Vec<_> = requests[0].answers.iter().map(|a| a.answer.as_str()).collect();
        assert_eq!(answers, vec!["A1", "A2"]);

        assert_eq!(candidates.list().len(), 1);
        let view = service.view(None).await;
        assert_eq!(view.step, FlowStep::Completed);
        assert_eq!(view.finalization, FinalizationStatus::Saved);
        assert!(!service.timer_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_finalization_notifies_once() {
        let (service, backend, candidates) = service(FakeBackend::new().failing_evaluations(3));
        start_interview(&service).await;
        service.view(None).await;

        service.submit_answer("A1").await.unwrap();
        if let Submitted::Finalizing(handle) = service.submit_answer("A2").await.unwrap() {
            handle.await.unwrap();
        }

        assert_eq!(backend.evaluation_attempts(), 3);
        assert!(candidates.list().is_empty());

        let view = service.view(None).await;
        assert_eq!(view.finalization, FinalizationStatus::Failed);
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].level, NoticeLevel::Error);
        assert_eq!(
            view.notices[0].message,
            "Failed to finalize interview. Please try again."
        );
        assert!(service.view(None).await.notices.is_empty());
    }

    #[tokio::test]
    async fn test_parse_failure_lands_on_form() {
        let (service, _, _) = service(FakeBackend::new().failing_parse());
        service.select_resume(pdf("resume.pdf")).await.unwrap();
        service.parse_resume().await.unwrap();

        let view = service.view(None).await;
        assert_eq!(view.step, FlowStep::FieldsForm);
        assert_eq!(view.notices[0].message, "AI Api is not Working");
        assert_eq!(view.fields, ContactFields::default());
    }

    #[tokio::test]
    async fn test_question_fetch_failure_returns_to_form() {
        let (service, _, _) = service(FakeBackend::new().failing_questions());
        service.select_resume(pdf("resume.pdf")).await.unwrap();
        service.parse_resume().await.unwrap();

        assert!(!service.confirm_fields(jane()).await.unwrap());
        assert_eq!(service.view(None).await.step, FlowStep::FieldsForm);
        assert!(!service.timer_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_auto_submits_and_finalizes() {
        let (service, backend, candidates) = service(FakeBackend::new());
        start_interview(&service).await;

        tokio::time::sleep(Duration::from_millis(3500)).await;

        let view = service.view(None).await;
        let chat = view.chat.expect("still interviewing");
        assert_eq!(chat.current_question, 2);
        assert_eq!(chat.messages[1].text, UNANSWERED);
        assert!(chat.time_up);

        tokio::time::sleep(Duration::from_secs(5)).await;

        let requests = backend.evaluation_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].answers.iter().all(|a| a.answer == UNANSWERED));
        assert_eq!(candidates.list().len(), 1);
        assert_eq!(service.view(None).await.step, FlowStep::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_new_stops_countdown() {
        let (service, _, _) = service(FakeBackend::new());
        start_interview(&service).await;
        assert!(service.timer_running());

        service.start_new().await.unwrap();
        assert!(!service.timer_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        let view = service.view(None).await;
        assert_eq!(view.step, FlowStep::UploadResume);
        assert!(view.chat.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_new_discards_pending_finalization() {
        let (service, backend, _) = service(FakeBackend::new().failing_evaluations(2));
        start_interview(&service).await;
        service.view(None).await;

        service.submit_answer("A1").await.unwrap();
        let handle = match service.submit_answer("A2").await.unwrap() {
            Submitted::Finalizing(handle) => handle,
            Submitted::NextQuestion => panic!("expected finalization"),
        };
        service.start_new().await.unwrap();
        handle.await.unwrap();

        assert_eq!(backend.evaluation_attempts(), 3);
        let view = service.view(None).await;
        assert_eq!(view.step, FlowStep::UploadResume);
        assert_eq!(view.finalization, FinalizationStatus::Idle);
        assert!(view.notices.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_question_ids_return_to_form() {
        let repeated = vec![
            Question {
                id: 7,
                question: "Q1".to_string(),
                difficulty: Difficulty::Easy,
            },
            Question {
                id: 7,
                question: "Q2".to_string(),
                difficulty: Difficulty::Hard,
            },
        ];
        let (service, _, _) = service(FakeBackend::new().with_questions(repeated));
        service.select_resume(pdf("resume.pdf")).await.unwrap();
        service.parse_resume().await.unwrap();

        assert!(!service.confirm_fields(jane()).await.unwrap());
        let view = service.view(None).await;
        assert_eq!(view.step, FlowStep::FieldsForm);
        assert!(view.chat.is_none());
        assert!(!service.timer_running());
    }

    #[tokio::test]
    async fn test_answer_outside_interview_rejected() {
        let (service, _, _) = service(FakeBackend::new());
        assert!(matches!(
            service.submit_answer("hello").await,
            Err(FlowError::InvalidStep { .. })
        ));
    }
}
