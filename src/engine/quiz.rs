// src/engine/quiz.rs

use std::collections::HashMap;

use crate::{
    error::AppError,
    models::question::{AnswerLetter, Question},
};

/// One timed question set: the subject currently being answered.
#[derive(Debug, Clone)]
pub struct QuizState {
    pub questions: Vec<Question>,
    /// At most one letter per question id; the last selection wins.
    pub answers: HashMap<String, AnswerLetter>,
    /// Seconds remaining.
    pub time_left: u32,
    /// Seconds granted at start.
    pub total_time: u32,
    pub finished: bool,
}

impl QuizState {
    pub fn new(questions: Vec<Question>, minutes: u32) -> Self {
        let total_time = minutes.saturating_mul(60);
        Self {
            questions,
            answers: HashMap::new(),
            time_left: total_time,
            total_time,
            finished: false,
        }
    }

    /// Records a selection. No feedback is given while the quiz runs.
    pub fn answer(&mut self, question_id: &str, letter: AnswerLetter) -> Result<(), AppError> {
        if self.finished {
            return Err(AppError::BadRequest("This quiz has already been submitted".to_string()));
        }
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::BadRequest(format!(
                "Question {} is not part of the current quiz",
                question_id
            )));
        }
        self.answers.insert(question_id.to_string(), letter);
        Ok(())
    }

    /// Takes one second off the clock and returns what is left.
    /// A finished quiz no longer counts down.
    pub fn countdown(&mut self) -> u32 {
        if !self.finished {
            self.time_left = self.time_left.saturating_sub(1);
        }
        self.time_left
    }

    /// Questions whose recorded letter is the correct one. Unanswered ones count as wrong.
    pub fn correct_count(&self) -> u32 {
        self.questions
            .iter()
            .filter(|q| q.is_correct(self.answers.get(&q.id).copied()))
            .count() as u32
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}
