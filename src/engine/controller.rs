// src/engine/controller.rs

//! The single active session slot.
//!
//! At most one exam or study session exists at a time. Starting either one
//! replaces whatever was there and stops its countdown. The countdown of an
//! exam is a tokio task tagged with the slot generation it was spawned for;
//! once the generation moves on the task stops touching the slot.

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};

use crate::{
    engine::{
        ExamStore,
        session::{ExamSession, ExamView, SubmitOutcome, TickOutcome},
        study::{Feedback, Navigation, StudySession, StudyView},
    },
    error::AppError,
    models::{exam_result::ExamResult, question::AnswerLetter},
};

pub enum ActiveSession {
    Exam(ExamSession),
    Study(StudySession),
}

#[derive(Default)]
struct Slot {
    generation: u64,
    active: Option<ActiveSession>,
    ticker: Option<JoinHandle<()>>,
    /// Kept for the result screen until the next exam completes.
    last_result: Option<ExamResult>,
}

impl Slot {
    /// Drops the active session and its countdown, and invalidates the old generation.
    fn clear(&mut self) {
        self.generation += 1;
        self.active = None;
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

#[derive(Clone)]
pub struct SessionController {
    slot: Arc<Mutex<Slot>>,
    store: Arc<dyn ExamStore>,
    tick_interval: Duration,
}

impl SessionController {
    pub fn new(store: Arc<dyn ExamStore>, tick_interval: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            store,
            tick_interval,
        }
    }

    /// Starts `session` and makes it the active one.
    ///
    /// The draw happens before the slot is touched, so a session that cannot
    /// start leaves the current one running.
    pub async fn start_exam(&self, mut session: ExamSession) -> Result<ExamView, AppError> {
        session.start(self.store.as_ref()).await?;
        let view = session.view();

        let mut slot = self.slot.lock().await;
        slot.clear();
        slot.active = Some(ActiveSession::Exam(session));
        let generation = slot.generation;
        slot.ticker = Some(self.spawn_ticker(generation));
        Ok(view)
    }

    pub async fn start_study(&self, subject_id: &str, subject_name: &str) -> Result<StudyView, AppError> {
        let study = StudySession::start(self.store.as_ref(), subject_id, subject_name).await?;
        let view = study.view();

        let mut slot = self.slot.lock().await;
        slot.clear();
        slot.active = Some(ActiveSession::Study(study));
        Ok(view)
    }

    /// Ends whatever session is active without recording anything.
    pub async fn discard(&self) {
        let mut slot = self.slot.lock().await;
        if slot.active.is_some() {
            tracing::info!("Active session discarded");
        }
        slot.clear();
    }

    pub async fn last_result(&self) -> Option<ExamResult> {
        self.slot.lock().await.last_result.clone()
    }

    async fn with_exam<R>(
        &self,
        f: impl FnOnce(&mut ExamSession) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut slot = self.slot.lock().await;
        match slot.active.as_mut() {
            Some(ActiveSession::Exam(session)) => f(session),
            _ => Err(AppError::NotFound("No exam is in progress".to_string())),
        }
    }

    async fn with_study<R>(
        &self,
        f: impl FnOnce(&mut StudySession) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut slot = self.slot.lock().await;
        match slot.active.as_mut() {
            Some(ActiveSession::Study(study)) => f(study),
            _ => Err(AppError::NotFound("No study session is active".to_string())),
        }
    }

    pub async fn exam_view(&self) -> Result<ExamView, AppError> {
        self.with_exam(|session| Ok(session.view())).await
    }

    pub async fn answer(&self, question_id: &str, letter: AnswerLetter) -> Result<ExamView, AppError> {
        self.with_exam(|session| {
            session.answer(question_id, letter)?;
            Ok(session.view())
        })
        .await
    }

    /// Submits the current subject by hand.
    pub async fn submit(&self) -> Result<SubmitOutcome, AppError> {
        let mut slot = self.slot.lock().await;
        let Some(ActiveSession::Exam(session)) = slot.active.as_mut() else {
            return Err(AppError::NotFound("No exam is in progress".to_string()));
        };

        let outcome = session.submit(self.store.as_ref()).await?;
        if let SubmitOutcome::Completed(result) = &outcome {
            slot.last_result = Some(result.clone());
            slot.clear();
        }
        Ok(outcome)
    }

    /// One countdown step for `generation`. Returns whether the ticker should keep going.
    async fn tick(&self, generation: u64) -> Result<bool, AppError> {
        let mut slot = self.slot.lock().await;
        if slot.generation != generation {
            return Ok(false);
        }
        let Some(ActiveSession::Exam(session)) = slot.active.as_mut() else {
            return Ok(false);
        };

        match session.tick(self.store.as_ref()).await? {
            TickOutcome::Idle => Ok(false),
            TickOutcome::Running { .. } | TickOutcome::Submitted(SubmitOutcome::Advanced { .. }) => {
                Ok(true)
            }
            TickOutcome::Submitted(SubmitOutcome::Completed(result)) => {
                slot.last_result = Some(result);
                // Detach rather than abort: this is the ticker's own handle.
                slot.ticker.take();
                slot.clear();
                Ok(false)
            }
        }
    }

    fn spawn_ticker(&self, generation: u64) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(controller.tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                match controller.tick(generation).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => tracing::error!("Countdown submit failed, retrying: {}", e),
                }
            }
            tracing::debug!("Countdown for session generation {} stopped", generation);
        })
    }

    pub async fn study_view(&self) -> Result<StudyView, AppError> {
        self.with_study(|study| Ok(study.view())).await
    }

    pub async fn study_answer(&self, question_id: &str, letter: AnswerLetter) -> Result<Feedback, AppError> {
        self.with_study(|study| study.answer(question_id, letter)).await
    }

    pub async fn study_reset(&self, question_id: &str) -> Result<StudyView, AppError> {
        self.with_study(|study| {
            study.reset(question_id)?;
            Ok(study.view())
        })
        .await
    }

    pub async fn study_navigate(&self, to: Navigation) -> Result<StudyView, AppError> {
        self.with_study(|study| {
            study.navigate(to)?;
            Ok(study.view())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::testing::FakeStore,
        models::exam_config::SubjectConfig,
    };

    fn step(subject_id: &str, count: u32) -> SubjectConfig {
        SubjectConfig {
            subject_id: subject_id.to_string(),
            subject_name: subject_id.to_string(),
            count,
            time: 1,
        }
    }

    fn controller(store: &Arc<FakeStore>) -> SessionController {
        SessionController::new(store.clone(), Duration::from_millis(5))
    }

    async fn wait_for_result(controller: &SessionController) -> Option<ExamResult> {
        for _ in 0..400 {
            if let Some(result) = controller.last_result().await {
                return Some(result);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }

    #[tokio::test]
    async fn countdown_submits_when_time_runs_out() {
        let store = Arc::new(FakeStore::with_pools(&[("a", 3)]));
        let controller = controller(&store);
        let view = controller
            .start_exam(ExamSession::single("A", step("a", 3)))
            .await
            .unwrap();
        assert_eq!(view.time_left, 60);

        let result = wait_for_result(&controller).await.expect("timer never fired");
        assert_eq!(result.subject_results[0].correct_count, 0);
        assert_eq!(store.saved().len(), 1);
        assert!(controller.exam_view().await.is_err());
    }

    #[tokio::test]
    async fn discard_stops_the_countdown() {
        let store = Arc::new(FakeStore::with_pools(&[("a", 3)]));
        let controller = controller(&store);
        controller
            .start_exam(ExamSession::single("A", step("a", 3)))
            .await
            .unwrap();
        controller.discard().await;

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(store.saved().is_empty());
        assert!(controller.last_result().await.is_none());
    }

    #[tokio::test]
    async fn starting_study_replaces_exam() {
        let store = Arc::new(FakeStore::with_pools(&[("a", 3)]));
        let controller = controller(&store);
        controller
            .start_exam(ExamSession::single("A", step("a", 3)))
            .await
            .unwrap();
        controller.start_study("a", "A").await.unwrap();

        assert!(matches!(controller.exam_view().await, Err(AppError::NotFound(_))));
        assert_eq!(controller.study_view().await.unwrap().progress.total, 3);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn failed_start_keeps_current_session() {
        let store = Arc::new(FakeStore::with_pools(&[("a", 3)]));
        let controller = controller(&store);
        controller.start_study("a", "A").await.unwrap();

        let err = controller
            .start_exam(ExamSession::single("B", step("b", 3)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyPool(_)));
        assert!(controller.study_view().await.is_ok());
    }

    #[tokio::test]
    async fn manual_submit_completes_and_keeps_last_result() {
        let store = Arc::new(FakeStore::with_pools(&[("a", 2)]));
        let controller = controller(&store);
        let view = controller
            .start_exam(ExamSession::single("A", step("a", 2)))
            .await
            .unwrap();
        for q in &view.questions {
            controller.answer(&q.id, AnswerLetter::A).await.unwrap();
        }

        let SubmitOutcome::Completed(result) = controller.submit().await.unwrap() else {
            panic!("expected completion");
        };
        assert!(result.total_passed);
        assert_eq!(controller.last_result().await, Some(result));
        assert!(controller.submit().await.is_err());
    }
}
