// src/engine/review.rs

//! Read-side view of a stored result for the review screen.

use serde::Serialize;

use crate::models::{
    exam_result::{ExamResult, SubjectResult},
    question::{AnswerLetter, Question},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
    pub question: Question,
    pub user_answer: Option<AnswerLetter>,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSection {
    pub subject: SubjectResult,
    pub items: Vec<ReviewItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", content = "entries", rename_all = "snake_case")]
pub enum Review {
    Sections(Vec<ReviewSection>),
    Flat(Vec<ReviewItem>),
}

fn item(result: &ExamResult, question: &Question) -> ReviewItem {
    let user_answer = result.user_answers.get(&question.id).copied();
    ReviewItem {
        question: question.clone(),
        user_answer,
        correct: question.is_correct(user_answer),
    }
}

/// The questions of subject `index`, located by cumulative offset.
///
/// `None` when the index is out of range or the slice would overrun the list.
pub fn subject_slice(result: &ExamResult, index: usize) -> Option<&[Question]> {
    let subjects = result.subject_results.get(..=index)?;
    let offset: usize = subjects[..index]
        .iter()
        .map(|s| s.total_questions as usize)
        .sum();
    let len = subjects[index].total_questions as usize;
    result.questions.get(offset..offset + len)
}

/// Groups a result's questions per subject.
///
/// Falls back to one flat list when the result has no subject breakdown or
/// the breakdown does not add up to the stored question count.
pub fn project(result: &ExamResult) -> Review {
    let flat = || Review::Flat(result.questions.iter().map(|q| item(result, q)).collect());

    if result.subject_results.is_empty() {
        return flat();
    }

    let declared: usize = result
        .subject_results
        .iter()
        .map(|s| s.total_questions as usize)
        .sum();
    if declared != result.questions.len() {
        tracing::warn!(
            "Result {} declares {} question(s) across subjects but stores {}; showing flat review",
            result.id,
            declared,
            result.questions.len()
        );
        return flat();
    }

    let sections = result
        .subject_results
        .iter()
        .enumerate()
        .map(|(i, subject)| ReviewSection {
            subject: subject.clone(),
            items: subject_slice(result, i)
                .unwrap_or_default()
                .iter()
                .map(|q| item(result, q))
                .collect(),
        })
        .collect();
    Review::Sections(sections)
}
