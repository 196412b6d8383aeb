// src/engine/mod.rs

//! In-memory quiz engines: timed exam sessions, untimed study, and the
//! read-side review projection of stored results.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::{
    error::AppError,
    models::{exam_result::ExamResult, question::Question},
    store::Store,
};

pub mod controller;
pub mod quiz;
pub mod review;
pub mod session;
pub mod study;

/// What the engines need from persistence.
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// The recursive question pool of a subject.
    async fn recursive_pool(&self, subject_id: &str) -> Result<Vec<Question>, AppError>;

    /// Persists a finished attempt.
    async fn record_result(&self, result: &ExamResult) -> Result<(), AppError>;
}

#[async_trait]
impl ExamStore for Store {
    async fn recursive_pool(&self, subject_id: &str) -> Result<Vec<Question>, AppError> {
        self.get_questions_by_subject_recursive(subject_id).await
    }

    async fn record_result(&self, result: &ExamResult) -> Result<(), AppError> {
        self.save_result(result).await
    }
}

/// Uniform sample of up to `count` questions without replacement, in random order.
/// A pool smaller than `count` is returned whole (shuffled).
pub fn draw(mut pool: Vec<Question>, count: usize) -> Vec<Question> {
    pool.shuffle(&mut rand::thread_rng());
    pool.truncate(count);
    pool
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{draw, testing::questions};

    #[test]
    fn draw_takes_distinct_questions_from_pool() {
        let pool = questions("s", 10);
        let drawn = draw(pool.clone(), 4);
        assert_eq!(drawn.len(), 4);

        let ids: HashSet<&str> = drawn.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert!(drawn.iter().all(|q| pool.contains(q)));
    }

    #[test]
    fn draw_from_small_pool_returns_everything() {
        let drawn = draw(questions("s", 3), 10);
        assert_eq!(drawn.len(), 3);
    }
}
