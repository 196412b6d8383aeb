// src/models/exam_config.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// One step of an exam: draw `count` questions from a subject's recursive pool
/// and give the candidate `time` minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubjectConfig {
    #[validate(length(min = 1))]
    pub subject_id: String,

    /// Snapshot of the subject name when the preset was saved; never re-resolved.
    pub subject_name: String,

    #[validate(range(min = 1, max = 1000))]
    pub count: u32,

    /// Time limit in minutes.
    #[validate(range(min = 1, max = 600))]
    pub time: u32,
}

/// Represents the 'exam_configs' table: a named exam template.
/// The order of `subjects` is the order the exam runs in.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamConfig {
    pub id: String,
    pub name: String,
    pub exam_type: String,
    pub level: String,
    pub subjects: Json<Vec<SubjectConfig>>,
}

/// DTO for creating or replacing an exam template.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveExamConfigRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub exam_type: String,
    #[serde(default)]
    pub level: String,
    #[validate(length(min = 1), nested)]
    pub subjects: Vec<SubjectConfig>,
}

impl SaveExamConfigRequest {
    pub fn into_config(self, id: String) -> ExamConfig {
        ExamConfig {
            id,
            name: self.name,
            exam_type: self.exam_type,
            level: self.level,
            subjects: Json(self.subjects),
        }
    }
}

pub fn new_exam_config_id() -> String {
    format!("exam-{}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(count: u32, time: u32) -> SubjectConfig {
        SubjectConfig {
            subject_id: "sub-1".to_string(),
            subject_name: "Anatomy".to_string(),
            count,
            time,
        }
    }

    #[test]
    fn rejects_empty_subject_list() {
        let req = SaveExamConfigRequest {
            name: "Midterm".to_string(),
            exam_type: String::new(),
            level: String::new(),
            subjects: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_zero_count_step() {
        let req = SaveExamConfigRequest {
            name: "Midterm".to_string(),
            exam_type: String::new(),
            level: String::new(),
            subjects: vec![step(0, 10)],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn subject_order_is_preserved() {
        let mut second = step(3, 10);
        second.subject_id = "sub-2".to_string();
        let config = SaveExamConfigRequest {
            name: "Midterm".to_string(),
            exam_type: "Final exam".to_string(),
            level: "Undergraduate".to_string(),
            subjects: vec![step(2, 5), second],
        }
        .into_config("exam-1".to_string());

        let ids: Vec<&str> = config.subjects.iter().map(|s| s.subject_id.as_str()).collect();
        assert_eq!(ids, ["sub-1", "sub-2"]);
    }
}
