// src/engine/session.rs

//! Multi-subject exam session.
//!
//! A session runs its subject configs in order. Each subject gets a fresh
//! random draw from its recursive pool and its own countdown; submitting it
//! (by hand or when the clock runs out) scores it, folds its questions and
//! answers into the running totals and moves on. After the last subject the
//! session assembles one `ExamResult`, persists it and is done.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::Serialize;
use sqlx::types::Json;

use crate::{
    config::DEFAULT_QUIZ_MINUTES,
    engine::{ExamStore, draw, quiz::QuizState},
    error::AppError,
    models::{
        exam_config::SubjectConfig,
        exam_result::{ExamResult, OriginalConfig, SubjectResult, next_result_id},
        question::{AnswerLetter, PublicQuestion, Question},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingStart,
    SubjectInProgress,
    Completed,
}

/// What a submit did.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The next subject is now running.
    Advanced { subject_index: usize, subject_result: SubjectResult },
    /// The last subject was submitted and the result persisted.
    Completed(ExamResult),
}

/// What a timer tick did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// No subject is running.
    Idle,
    Running { time_left: u32 },
    /// The clock hit zero and the subject was submitted.
    Submitted(SubmitOutcome),
}

#[derive(Debug, Clone)]
pub struct ExamSession {
    name: String,
    configs: Vec<SubjectConfig>,
    is_multi_subject: bool,
    /// Recorded into the result so a retry can reproduce the run.
    original_config: Option<OriginalConfig>,
    /// Questions used instead of a draw for the first subject (legacy retry).
    fixed_questions: Option<Vec<Question>>,

    phase: SessionPhase,
    current_index: usize,
    results: Vec<SubjectResult>,
    all_questions: Vec<Question>,
    all_answers: HashMap<String, AnswerLetter>,
    quiz: Option<QuizState>,
}

impl ExamSession {
    /// A session over an ordered list of subject configs (an exam template).
    pub fn new(name: impl Into<String>, configs: Vec<SubjectConfig>) -> Result<Self, AppError> {
        let name = name.into();
        if configs.is_empty() {
            return Err(AppError::BadRequest(format!("Exam '{}' has no subjects", name)));
        }
        let original_config = OriginalConfig {
            name: name.clone(),
            configs: configs.clone(),
            total_time: None,
        };
        Ok(Self::build(name, configs, true, Some(original_config), None))
    }

    /// Self-select mode: exactly one subject, no multi-subject wrapper.
    pub fn single(name: impl Into<String>, config: SubjectConfig) -> Self {
        let name = name.into();
        let original_config = OriginalConfig {
            name: name.clone(),
            configs: vec![config.clone()],
            total_time: Some(config.time),
        };
        Self::build(name, vec![config], false, Some(original_config), None)
    }

    /// A one-subject quiz over a fixed question list, shuffled, without drawing.
    pub fn from_questions(
        name: impl Into<String>,
        subject_id: impl Into<String>,
        mut questions: Vec<Question>,
        minutes: u32,
    ) -> Self {
        let name = name.into();
        questions.shuffle(&mut rand::thread_rng());
        let config = SubjectConfig {
            subject_id: subject_id.into(),
            subject_name: name.clone(),
            count: questions.len() as u32,
            time: minutes,
        };
        Self::build(name, vec![config], false, None, Some(questions))
    }

    fn build(
        name: String,
        configs: Vec<SubjectConfig>,
        is_multi_subject: bool,
        original_config: Option<OriginalConfig>,
        fixed_questions: Option<Vec<Question>>,
    ) -> Self {
        Self {
            name,
            configs,
            is_multi_subject,
            original_config,
            fixed_questions,
            phase: SessionPhase::AwaitingStart,
            current_index: 0,
            results: Vec::new(),
            all_questions: Vec::new(),
            all_answers: HashMap::new(),
            quiz: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn configs(&self) -> &[SubjectConfig] {
        &self.configs
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_config(&self) -> &SubjectConfig {
        &self.configs[self.current_index]
    }

    pub fn quiz(&self) -> Option<&QuizState> {
        self.quiz.as_ref()
    }

    pub fn subject_results(&self) -> &[SubjectResult] {
        &self.results
    }

    pub fn accumulated_questions(&self) -> &[Question] {
        &self.all_questions
    }

    /// Checks that every subject has questions, then draws the first one.
    ///
    /// Nothing is started when any subject's pool is empty.
    pub async fn start(&mut self, store: &dyn ExamStore) -> Result<(), AppError> {
        if self.phase != SessionPhase::AwaitingStart {
            return Err(AppError::BadRequest("Session has already started".to_string()));
        }

        let first = match self.fixed_questions.take() {
            Some(questions) if !questions.is_empty() => {
                QuizState::new(questions, self.configs[0].time)
            }
            Some(_) => {
                return Err(AppError::EmptyPool(format!(
                    "'{}' has no questions to retry",
                    self.name
                )));
            }
            None => {
                for config in self.configs.iter().skip(1) {
                    if store.recursive_pool(&config.subject_id).await?.is_empty() {
                        return Err(empty_pool(config));
                    }
                }
                draw_quiz(store, &self.configs[0]).await?
            }
        };

        self.all_questions.extend(first.questions.iter().cloned());
        self.quiz = Some(first);
        self.phase = SessionPhase::SubjectInProgress;

        tracing::info!(
            "Exam '{}' started: {} subject(s), first draw {} question(s)",
            self.name,
            self.configs.len(),
            self.all_questions.len()
        );
        Ok(())
    }

    fn running_quiz(&mut self) -> Result<&mut QuizState, AppError> {
        match (self.phase, self.quiz.as_mut()) {
            (SessionPhase::SubjectInProgress, Some(quiz)) => Ok(quiz),
            _ => Err(AppError::BadRequest("No subject is in progress".to_string())),
        }
    }

    pub fn answer(&mut self, question_id: &str, letter: AnswerLetter) -> Result<(), AppError> {
        self.running_quiz()?.answer(question_id, letter)
    }

    /// One second of the countdown. Reaching zero submits the current subject.
    pub async fn tick(&mut self, store: &dyn ExamStore) -> Result<TickOutcome, AppError> {
        let time_left = match self.running_quiz() {
            Ok(quiz) => quiz.countdown(),
            Err(_) => return Ok(TickOutcome::Idle),
        };
        if time_left > 0 {
            return Ok(TickOutcome::Running { time_left });
        }

        tracing::info!(
            "Time is up for '{}' in exam '{}'; submitting",
            self.current_config().subject_name,
            self.name
        );
        Ok(TickOutcome::Submitted(self.submit(store).await?))
    }

    /// Scores the current subject and either starts the next one or finishes the exam.
    ///
    /// A later subject whose pool has emptied since the exam began is recorded
    /// as failed with no questions and passed over. The next draw and the final
    /// save both happen before any state changes, so any other failure leaves
    /// the current subject open to be submitted again.
    pub async fn submit(&mut self, store: &dyn ExamStore) -> Result<SubmitOutcome, AppError> {
        let quiz = self.running_quiz()?;
        let total = quiz.questions.len() as u32;
        let correct = quiz.correct_count();
        let config = &self.configs[self.current_index];
        let subject_result =
            SubjectResult::scored(&config.subject_id, &config.subject_name, correct, total);

        let mut passed_over = Vec::new();
        let mut next = None;
        for index in self.current_index + 1..self.configs.len() {
            let config = &self.configs[index];
            match draw_quiz(store, config).await {
                Ok(quiz) => {
                    next = Some((index, quiz));
                    break;
                }
                Err(AppError::EmptyPool(msg)) => {
                    tracing::warn!("Exam '{}': {}; subject recorded as failed", self.name, msg);
                    passed_over.push(SubjectResult::scored(
                        &config.subject_id,
                        &config.subject_name,
                        0,
                        0,
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        if let Some((next_index, next_quiz)) = next {
            self.close_current(subject_result.clone());
            self.results.extend(passed_over);

            self.all_questions.extend(next_quiz.questions.iter().cloned());
            self.quiz = Some(next_quiz);
            self.current_index = next_index;

            tracing::info!(
                "Exam '{}': subject {}/{} started",
                self.name,
                next_index + 1,
                self.configs.len()
            );
            return Ok(SubmitOutcome::Advanced {
                subject_index: next_index,
                subject_result,
            });
        }

        let mut closing = vec![subject_result.clone()];
        closing.extend(passed_over.iter().cloned());
        let result = self.assemble_result(&closing);
        store.record_result(&result).await?;

        self.close_current(subject_result);
        self.results.extend(passed_over);
        self.current_index = self.configs.len() - 1;
        self.phase = SessionPhase::Completed;

        tracing::info!(
            "Exam '{}' completed: passed={}, {} question(s)",
            self.name,
            result.total_passed,
            result.questions.len()
        );
        Ok(SubmitOutcome::Completed(result))
    }

    /// Marks the running quiz finished and folds its outcome into the totals.
    fn close_current(&mut self, subject_result: SubjectResult) {
        if let Some(quiz) = self.quiz.as_mut() {
            quiz.finished = true;
            self.all_answers
                .extend(quiz.answers.iter().map(|(id, letter)| (id.clone(), *letter)));
        }
        self.results.push(subject_result);
    }

    /// The final record as it would be after closing the current subject and
    /// appending `closing` to the subject results.
    fn assemble_result(&self, closing: &[SubjectResult]) -> ExamResult {
        let mut subject_results = self.results.clone();
        subject_results.extend_from_slice(closing);

        let mut user_answers = self.all_answers.clone();
        if let Some(quiz) = &self.quiz {
            user_answers.extend(quiz.answers.iter().map(|(id, letter)| (id.clone(), *letter)));
        }

        let now = chrono::Utc::now().timestamp_millis();
        ExamResult {
            id: next_result_id(now),
            name: self.name.clone(),
            date: now,
            is_multi_subject: self.is_multi_subject,
            total_passed: subject_results.iter().all(|r| r.passed),
            subject_results: Json(subject_results),
            questions: Json(self.all_questions.clone()),
            user_answers: Json(user_answers),
            original_config: self.original_config.clone().map(Json),
        }
    }

    /// Client-facing state. Correct letters and explanations are never included.
    pub fn view(&self) -> ExamView {
        let quiz = self.quiz.as_ref();
        ExamView {
            name: self.name.clone(),
            phase: self.phase,
            is_multi_subject: self.is_multi_subject,
            subject_index: self.current_index,
            subject_count: self.configs.len(),
            subject_name: self.current_config().subject_name.clone(),
            time_left: quiz.map_or(0, |q| q.time_left),
            total_time: quiz.map_or(0, |q| q.total_time),
            questions: quiz
                .map(|q| q.questions.iter().map(PublicQuestion::from).collect())
                .unwrap_or_default(),
            answers: quiz.map(|q| q.answers.clone()).unwrap_or_default(),
            completed: self.results.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamView {
    pub name: String,
    pub phase: SessionPhase,
    pub is_multi_subject: bool,
    pub subject_index: usize,
    pub subject_count: usize,
    pub subject_name: String,
    pub time_left: u32,
    pub total_time: u32,
    pub questions: Vec<PublicQuestion>,
    pub answers: HashMap<String, AnswerLetter>,
    pub completed: Vec<SubjectResult>,
}

fn empty_pool(config: &SubjectConfig) -> AppError {
    AppError::EmptyPool(format!("Subject '{}' has no questions", config.subject_name))
}

async fn draw_quiz(store: &dyn ExamStore, config: &SubjectConfig) -> Result<QuizState, AppError> {
    let pool = store.recursive_pool(&config.subject_id).await?;
    if pool.is_empty() {
        return Err(empty_pool(config));
    }
    Ok(QuizState::new(draw(pool, config.count as usize), config.time))
}

/// Rebuilds a session from a stored result.
///
/// Results with an `original_config` re-run the same subjects, counts and
/// times with fresh draws. Older results without one replay their stored
/// questions as a single quiz.
pub fn retry_session(result: &ExamResult) -> Result<ExamSession, AppError> {
    match &result.original_config {
        Some(Json(original)) if original.configs.len() == 1 && !result.is_multi_subject => {
            Ok(ExamSession::single(original.name.clone(), original.configs[0].clone()))
        }
        Some(Json(original)) => ExamSession::new(original.name.clone(), original.configs.clone()),
        None => {
            let subject_id = result
                .subject_results
                .first()
                .map(|r| r.subject_id.clone())
                .unwrap_or_default();
            Ok(ExamSession::from_questions(
                result.name.clone(),
                subject_id,
                result.questions.0.clone(),
                DEFAULT_QUIZ_MINUTES,
            ))
        }
    }
}
