// src/models/exam_result.rs

use std::{
    collections::HashMap,
    sync::atomic::{AtomicI64, Ordering},
};

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::{
    config::{PASS_RATIO, SCORE_SCALE},
    models::{
        exam_config::SubjectConfig,
        question::{AnswerLetter, Question},
    },
};

/// Outcome of one subject inside an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResult {
    #[serde(default)]
    pub subject_id: String,
    pub subject_name: String,
    /// 0..=10, one decimal.
    pub score: f64,
    pub correct_count: u32,
    pub total_questions: u32,
    pub passed: bool,
}

impl SubjectResult {
    /// Scores `correct_count` out of `total_questions`.
    /// An empty subject scores 0 and fails.
    pub fn scored(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        correct_count: u32,
        total_questions: u32,
    ) -> Self {
        let ratio = if total_questions == 0 {
            0.0
        } else {
            correct_count as f64 / total_questions as f64
        };
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            score: round_one_decimal(ratio * SCORE_SCALE),
            correct_count,
            total_questions,
            passed: total_questions > 0 && ratio >= PASS_RATIO,
        }
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Snapshot of what was run, so the exam can be retried with the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalConfig {
    pub name: String,
    pub configs: Vec<SubjectConfig>,
    /// Minutes, recorded for single-subject quizzes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u32>,
}

/// Represents the 'results' table: one completed attempt. Never mutated after insert.
///
/// `questions` is the flat list of everything presented, in subject order and
/// then draw order; `subject_results[i].total_questions` says how many of them
/// belong to subject `i`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: String,
    pub name: String,
    /// Completion time, milliseconds since the Unix epoch.
    pub date: i64,
    pub is_multi_subject: bool,
    pub total_passed: bool,
    #[serde(default)]
    pub subject_results: Json<Vec<SubjectResult>>,
    pub questions: Json<Vec<Question>>,
    pub user_answers: Json<HashMap<String, AnswerLetter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_config: Option<Json<OriginalConfig>>,
}

static LAST_RESULT_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp id, strictly increasing within this process.
pub fn next_result_id(now_ms: i64) -> String {
    let mut last = LAST_RESULT_ID.load(Ordering::Relaxed);
    loop {
        let next = now_ms.max(last + 1);
        match LAST_RESULT_ID.compare_exchange(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}
