// src/models/attributes.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use crate::{
    config::{DEFAULT_EXAM_TYPES, DEFAULT_LEVELS, DEFAULT_SUBJECT_TYPES},
    error::AppError,
};

/// The app-wide enumeration lists used to tag subjects and exam templates.
/// Removing a value does not retag subjects that use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppAttributes {
    pub exam_types: Vec<String>,
    pub levels: Vec<String>,
    pub subject_types: Vec<String>,
}

impl Default for AppAttributes {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            exam_types: owned(&DEFAULT_EXAM_TYPES),
            levels: owned(&DEFAULT_LEVELS),
            subject_types: owned(&DEFAULT_SUBJECT_TYPES),
        }
    }
}

/// Which of the three lists an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeKind {
    ExamTypes,
    Levels,
    SubjectTypes,
}

impl AppAttributes {
    fn list_mut(&mut self, kind: AttributeKind) -> &mut Vec<String> {
        match kind {
            AttributeKind::ExamTypes => &mut self.exam_types,
            AttributeKind::Levels => &mut self.levels,
            AttributeKind::SubjectTypes => &mut self.subject_types,
        }
    }

    /// Appends `value` unless it is blank or already listed. Returns whether it was added.
    pub fn add(&mut self, kind: AttributeKind, value: &str) -> Result<bool, AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::BadRequest("Attribute value cannot be empty".to_string()));
        }
        let list = self.list_mut(kind);
        if list.iter().any(|v| v == value) {
            return Ok(false);
        }
        list.push(value.to_string());
        Ok(true)
    }

    /// Removes every occurrence of `value`. Returns whether anything was removed.
    pub fn remove(&mut self, kind: AttributeKind, value: &str) -> bool {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|v| v != value);
        list.len() != before
    }

    pub fn first_exam_type(&self) -> Option<&str> {
        self.exam_types.first().map(String::as_str)
    }

    pub fn first_level(&self) -> Option<&str> {
        self.levels.first().map(String::as_str)
    }

    pub fn first_subject_type(&self) -> Option<&str> {
        self.subject_types.first().map(String::as_str)
    }
}

/// Raw 'attributes' row. Only the row keyed `global` is ever read.
#[derive(Debug, FromRow)]
pub struct AttributesRow {
    pub exam_types: Json<Vec<String>>,
    pub levels: Json<Vec<String>>,
    pub subject_types: Json<Vec<String>>,
}

impl From<AttributesRow> for AppAttributes {
    fn from(row: AttributesRow) -> Self {
        AppAttributes {
            exam_types: row.exam_types.0,
            levels: row.levels.0,
            subject_types: row.subject_types.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_non_empty() {
        let attrs = AppAttributes::default();
        assert_eq!(attrs.exam_types.len(), 3);
        assert_eq!(attrs.levels.len(), 4);
        assert_eq!(attrs.subject_types.len(), 5);
    }

    #[test]
    fn add_skips_duplicates_and_blanks() {
        let mut attrs = AppAttributes::default();
        assert!(attrs.add(AttributeKind::Levels, "Residency").unwrap());
        assert!(!attrs.add(AttributeKind::Levels, " Residency ").unwrap());
        assert!(attrs.add(AttributeKind::Levels, "  ").is_err());
        assert_eq!(attrs.levels.last().map(String::as_str), Some("Residency"));
    }

    #[test]
    fn remove_reports_whether_present() {
        let mut attrs = AppAttributes::default();
        assert!(attrs.remove(AttributeKind::ExamTypes, "Final exam"));
        assert!(!attrs.remove(AttributeKind::ExamTypes, "Final exam"));
        assert_eq!(attrs.exam_types.len(), 2);
    }
}
