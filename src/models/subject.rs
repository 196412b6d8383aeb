// src/models/subject.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// Represents the 'subjects' table: one node of the topic hierarchy.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,

    pub name: String,

    /// Owning subject. A subject is never its own ancestor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub exam_type: Option<String>,

    #[serde(default)]
    pub level: Option<String>,

    /// Subject category tag (taken from the attribute registry).
    #[serde(default)]
    pub category: Option<String>,

    /// Denormalized count of questions owned directly by this subject.
    #[serde(default)]
    pub total_questions: i64,

    #[serde(default)]
    pub learned_count: i64,

    #[serde(default)]
    pub need_review_count: i64,
}

impl Subject {
    /// Creates a root subject with a fresh id and zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_subject_id(),
            name: name.into(),
            parent_id: None,
            exam_type: None,
            level: None,
            category: None,
            total_questions: 0,
            learned_count: 0,
            need_review_count: 0,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

pub fn new_subject_id() -> String {
    format!("sub-{}", uuid::Uuid::new_v4())
}

/// DTO for creating a subject by hand.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    #[validate(custom(function = validate_subject_name))]
    pub name: String,
    pub parent_id: Option<String>,
    #[validate(length(max = 100))]
    pub exam_type: Option<String>,
    #[validate(length(max = 100))]
    pub level: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
}

/// DTO for renaming, moving or retagging a subject. Fields are optional.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubjectRequest {
    #[validate(custom(function = validate_subject_name))]
    pub name: Option<String>,
    /// `Some("")` detaches the subject and makes it a root.
    pub parent_id: Option<String>,
    pub exam_type: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

/// Names are stored trimmed, so the trimmed text is what must fit.
fn validate_subject_name(name: &str) -> Result<(), validator::ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(validator::ValidationError::new("subject_name_blank"));
    }
    if trimmed.chars().count() > 200 {
        return Err(validator::ValidationError::new("subject_name_too_long"));
    }
    Ok(())
}

/// Query filters for listing subjects.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectFilter {
    pub search: Option<String>,
    pub exam_type: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub roots_only: bool,
}

impl SubjectFilter {
    pub fn matches(&self, subject: &Subject) -> bool {
        let tag_matches = |wanted: &Option<String>, actual: &Option<String>| match wanted {
            Some(w) => actual.as_deref() == Some(w.as_str()),
            None => true,
        };

        let name_matches = match &self.search {
            Some(term) => subject.name.to_lowercase().contains(&term.to_lowercase()),
            None => true,
        };

        name_matches
            && tag_matches(&self.exam_type, &subject.exam_type)
            && tag_matches(&self.level, &subject.level)
            && tag_matches(&self.category, &subject.category)
            && (!self.roots_only || subject.is_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_matches_name_case_insensitively() {
        let s = Subject::new("Human Anatomy");
        let filter = SubjectFilter {
            search: Some("anat".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&s));
    }

    #[test]
    fn roots_only_excludes_children() {
        let child = Subject::new("Bones").with_parent("sub-1");
        let filter = SubjectFilter {
            roots_only: true,
            ..Default::default()
        };
        assert!(!filter.matches(&child));
        assert!(filter.matches(&Subject::new("Anatomy")));
    }

    #[test]
    fn tag_filter_requires_exact_tag() {
        let mut s = Subject::new("Physiology");
        s.level = Some("Undergraduate".to_string());
        let filter = SubjectFilter {
            level: Some("Postgraduate".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&s));
    }

    #[test]
    fn blank_names_fail_validation() {
        let create = CreateSubjectRequest {
            name: "   ".to_string(),
            parent_id: None,
            exam_type: None,
            level: None,
            category: None,
        };
        assert!(create.validate().is_err());

        let rename = UpdateSubjectRequest {
            name: Some("\t ".to_string()),
            parent_id: None,
            exam_type: None,
            level: None,
            category: None,
        };
        assert!(rename.validate().is_err());

        let padded = CreateSubjectRequest {
            name: "  Anatomy ".to_string(),
            ..create
        };
        assert!(padded.validate().is_ok());
    }
}
