// src/engine/study.rs

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{
    engine::ExamStore,
    error::AppError,
    models::question::{AnswerLetter, OptionImages, Question},
};

/// Revealed as soon as a study question is answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub selected: AnswerLetter,
    pub correct: bool,
    pub correct_answer: AnswerLetter,
    pub explanation: Option<String>,
    pub explanation_image: Option<String>,
}

/// Untimed practice over one subject's recursive pool.
///
/// Questions are shuffled once at start. Answering locks a question and
/// reveals its feedback until it is reset. Nothing is scored or persisted.
#[derive(Debug, Clone)]
pub struct StudySession {
    subject_id: String,
    subject_name: String,
    questions: Vec<Question>,
    feedback: Vec<Option<Feedback>>,
    current: usize,
}

impl StudySession {
    pub async fn start(
        store: &dyn ExamStore,
        subject_id: &str,
        subject_name: &str,
    ) -> Result<Self, AppError> {
        let mut questions = store.recursive_pool(subject_id).await?;
        if questions.is_empty() {
            return Err(AppError::EmptyPool(format!(
                "Subject '{}' has no questions",
                subject_name
            )));
        }
        questions.shuffle(&mut rand::thread_rng());

        tracing::info!("Study started on '{}' with {} question(s)", subject_name, questions.len());
        Ok(Self {
            subject_id: subject_id.to_string(),
            subject_name: subject_name.to_string(),
            feedback: vec![None; questions.len()],
            questions,
            current: 0,
        })
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn position(&self, question_id: &str) -> Result<usize, AppError> {
        self.questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| {
                AppError::BadRequest(format!("Question {} is not part of this study session", question_id))
            })
    }

    /// Locks in `letter` for a question. A locked question must be reset first.
    pub fn answer(&mut self, question_id: &str, letter: AnswerLetter) -> Result<Feedback, AppError> {
        let index = self.position(question_id)?;
        if self.feedback[index].is_some() {
            return Err(AppError::Conflict(format!(
                "Question {} is already answered; reset it to try again",
                question_id
            )));
        }

        let question = &self.questions[index];
        let feedback = Feedback {
            selected: letter,
            correct: question.is_correct(Some(letter)),
            correct_answer: question.correct_answer,
            explanation: question.explanation.clone(),
            explanation_image: question.explanation_image.clone(),
        };
        self.feedback[index] = Some(feedback.clone());
        Ok(feedback)
    }

    /// Clears the answer and feedback of one question.
    pub fn reset(&mut self, question_id: &str) -> Result<(), AppError> {
        let index = self.position(question_id)?;
        self.feedback[index] = None;
        Ok(())
    }

    pub fn go_to(&mut self, index: usize) -> Result<(), AppError> {
        if index >= self.questions.len() {
            return Err(AppError::BadRequest(format!(
                "Question index {} is out of range (0..{})",
                index,
                self.questions.len()
            )));
        }
        self.current = index;
        Ok(())
    }

    /// Moves forward one question; stays put on the last one.
    pub fn next(&mut self) -> usize {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        self.current
    }

    pub fn previous(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    pub fn navigate(&mut self, to: Navigation) -> Result<usize, AppError> {
        match to {
            Navigation::Next => Ok(self.next()),
            Navigation::Previous => Ok(self.previous()),
            Navigation::Index { index } => self.go_to(index).map(|_| index),
        }
    }

    pub fn progress(&self) -> StudyProgress {
        let answered = self.feedback.iter().flatten().count();
        let correct = self.feedback.iter().flatten().filter(|f| f.correct).count();
        StudyProgress {
            total: self.questions.len(),
            answered,
            correct,
        }
    }

    pub fn view(&self) -> StudyView {
        StudyView {
            subject_id: self.subject_id.clone(),
            subject_name: self.subject_name.clone(),
            current_index: self.current,
            progress: self.progress(),
            questions: self
                .questions
                .iter()
                .zip(&self.feedback)
                .map(|(q, f)| StudyQuestion {
                    id: q.id.clone(),
                    content: q.content.clone(),
                    image: q.image.clone(),
                    option_a: q.option_a.clone(),
                    option_b: q.option_b.clone(),
                    option_c: q.option_c.clone(),
                    option_d: q.option_d.clone(),
                    option_images: q.option_images.clone(),
                    feedback: f.clone(),
                })
                .collect(),
        }
    }
}

/// Where to move in a study session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Navigation {
    Next,
    Previous,
    Index { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudyProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
}

/// A study question; the answer is only included once it has been revealed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQuestion {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_images: Option<OptionImages>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyView {
    pub subject_id: String,
    pub subject_name: String,
    pub current_index: usize,
    pub progress: StudyProgress,
    pub questions: Vec<StudyQuestion>,
}
