// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::error::AppError;

/// The letter of one of the four options. Every question has exactly one correct letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLetter::A => "A",
            AnswerLetter::B => "B",
            AnswerLetter::C => "C",
            AnswerLetter::D => "D",
        }
    }
}

impl fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `A`..`D` in either case, and the option numbers `1`..`4` used by question packs.
impl FromStr for AnswerLetter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "1" => Ok(AnswerLetter::A),
            "B" | "2" => Ok(AnswerLetter::B),
            "C" | "3" => Ok(AnswerLetter::C),
            "D" | "4" => Ok(AnswerLetter::D),
            other => Err(AppError::BadRequest(format!("'{}' is not an option letter", other))),
        }
    }
}

/// Learning status. Written on creation, not read by any engine yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    #[default]
    Unlearned,
    Learned,
    FrequentMistake,
}

impl QuestionStatus {
    pub fn as_i64(&self) -> i64 {
        match self {
            QuestionStatus::Unlearned => 0,
            QuestionStatus::Learned => 1,
            QuestionStatus::FrequentMistake => 2,
        }
    }

    pub fn from_i64(value: i64) -> Self {
        match value {
            1 => QuestionStatus::Learned,
            2 => QuestionStatus::FrequentMistake,
            _ => QuestionStatus::Unlearned,
        }
    }
}

/// Optional per-option images (data URLs or links).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl OptionImages {
    pub fn is_empty(&self) -> bool {
        self.a.is_none() && self.b.is_none() && self.c.is_none() && self.d.is_none()
    }
}

/// One multiple-choice item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,

    /// Owning subject. Not checked on write; readers tolerate dangling ids.
    pub subject_id: String,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_images: Option<OptionImages>,

    pub correct_answer: AnswerLetter,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation_image: Option<String>,

    #[serde(default)]
    pub status: QuestionStatus,
}

impl Question {
    pub fn is_correct(&self, answer: Option<AnswerLetter>) -> bool {
        answer == Some(self.correct_answer)
    }
}

pub fn new_question_id() -> String {
    format!("q-{}", uuid::Uuid::new_v4())
}

/// Raw 'questions' row; letters and status are stored as text/integer.
#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub id: String,
    pub subject_id: String,
    pub content: String,
    pub image: Option<String>,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub option_images: Option<Json<OptionImages>>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub explanation_image: Option<String>,
    pub status: i64,
}

impl TryFrom<QuestionRow> for Question {
    type Error = AppError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let correct_answer = row.correct_answer.parse::<AnswerLetter>().map_err(|_| {
            AppError::InternalServerError(format!(
                "question {} has corrupt answer '{}'",
                row.id, row.correct_answer
            ))
        })?;

        Ok(Question {
            id: row.id,
            subject_id: row.subject_id,
            content: row.content,
            image: row.image,
            option_a: row.option_a,
            option_b: row.option_b,
            option_c: row.option_c,
            option_d: row.option_d,
            option_images: row.option_images.map(|j| j.0),
            correct_answer,
            explanation: row.explanation,
            explanation_image: row.explanation_image,
            status: QuestionStatus::from_i64(row.status),
        })
    }
}

/// DTO for sending a question while an exam is running (excludes answer and explanation).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
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
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id.clone(),
            content: q.content.clone(),
            image: q.image.clone(),
            option_a: q.option_a.clone(),
            option_b: q.option_b.clone(),
            option_c: q.option_c.clone(),
            option_d: q.option_d.clone(),
            option_images: q.option_images.clone(),
        }
    }
}

/// DTO for creating or editing a question by hand.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub subject_id: String,
    #[validate(length(min = 1, max = 5000))]
    pub content: String,
    pub image: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub option_a: String,
    #[validate(length(max = 2000))]
    pub option_b: String,
    #[validate(length(max = 2000))]
    pub option_c: String,
    #[validate(length(max = 2000))]
    pub option_d: String,
    pub option_images: Option<OptionImages>,
    pub correct_answer: AnswerLetter,
    #[validate(length(max = 10000))]
    pub explanation: Option<String>,
    pub explanation_image: Option<String>,
}

impl CreateQuestionRequest {
    /// Builds the stored record; empty optional strings are dropped.
    pub fn into_question(self, id: String) -> Question {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Question {
            id,
            subject_id: self.subject_id,
            content: self.content,
            image: non_empty(self.image),
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            option_images: self.option_images.filter(|imgs| !imgs.is_empty()),
            correct_answer: self.correct_answer,
            explanation: non_empty(self.explanation),
            explanation_image: non_empty(self.explanation_image),
            status: QuestionStatus::Unlearned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_parses_letters_and_option_numbers() {
        assert_eq!("b".parse::<AnswerLetter>().unwrap(), AnswerLetter::B);
        assert_eq!(" D ".parse::<AnswerLetter>().unwrap(), AnswerLetter::D);
        assert_eq!("3".parse::<AnswerLetter>().unwrap(), AnswerLetter::C);
        assert!("E".parse::<AnswerLetter>().is_err());
        assert!("AB".parse::<AnswerLetter>().is_err());
    }

    #[test]
    fn letter_serializes_as_bare_letter() {
        let json = serde_json::to_string(&AnswerLetter::C).unwrap();
        assert_eq!(json, "\"C\"");
    }

    #[test]
    fn corrupt_row_is_rejected() {
        let row = QuestionRow {
            id: "q-1".to_string(),
            subject_id: "sub-1".to_string(),
            content: "?".to_string(),
            image: None,
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            option_images: None,
            correct_answer: "AB".to_string(),
            explanation: None,
            explanation_image: None,
            status: 0,
        };
        assert!(Question::try_from(row).is_err());
    }

    #[test]
    fn public_question_hides_answer() {
        let q = CreateQuestionRequest {
            subject_id: "sub-1".to_string(),
            content: "Largest bone?".to_string(),
            image: Some(String::new()),
            option_a: "Femur".to_string(),
            option_b: "Tibia".to_string(),
            option_c: "Ulna".to_string(),
            option_d: "Radius".to_string(),
            option_images: Some(OptionImages::default()),
            correct_answer: AnswerLetter::A,
            explanation: Some("Thigh bone".to_string()),
            explanation_image: None,
        }
        .into_question("q-1".to_string());

        assert_eq!(q.image, None);
        assert_eq!(q.option_images, None);

        let value = serde_json::to_value(PublicQuestion::from(&q)).unwrap();
        assert!(value.get("correctAnswer").is_none());
        assert!(value.get("explanation").is_none());
        assert_eq!(value["optionA"], "Femur");
    }
}
