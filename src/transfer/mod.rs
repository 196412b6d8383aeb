// src/transfer/mod.rs

//! Moving question banks in and out of the store: nested JSON packs (local
//! or downloaded), flat tables into one subject, and the nested JSON export.

use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::{attributes::AppAttributes, question::Question, subject::Subject},
    store::Store,
};

pub mod export;
pub mod json;
pub mod remote;
pub mod table;

/// Tags given by the caller for subjects an import creates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    pub exam_type: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

/// Tags stamped on every newly created subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectTags {
    pub exam_type: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

impl SubjectTags {
    /// Caller metadata first, then the first entry of each attribute list.
    pub fn resolve(metadata: &ImportMetadata, attrs: &AppAttributes) -> Self {
        let pick = |given: &Option<String>, fallback: Option<&str>| {
            given
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .or(fallback)
                .map(str::to_string)
        };
        Self {
            exam_type: pick(&metadata.exam_type, attrs.first_exam_type()),
            level: pick(&metadata.level, attrs.first_level()),
            category: pick(&metadata.category, attrs.first_subject_type()),
        }
    }
}

/// Everything an import will write, computed before anything is written.
#[derive(Debug, Default)]
pub struct ImportPlan {
    /// Subjects to create. Reused subjects are not repeated here.
    pub subjects: Vec<Subject>,
    pub questions: Vec<Question>,
    pub reused_subjects: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub subjects_created: usize,
    pub subjects_reused: usize,
    pub questions_imported: usize,
    pub skipped: usize,
}

/// Writes a plan in one transaction.
pub async fn apply(store: &Store, plan: ImportPlan) -> Result<ImportSummary, AppError> {
    store.import_batch(&plan.subjects, &plan.questions).await?;

    let summary = ImportSummary {
        subjects_created: plan.subjects.len(),
        subjects_reused: plan.reused_subjects,
        questions_imported: plan.questions.len(),
        skipped: plan.skipped,
    };
    tracing::info!(
        "Import finished: {} new subject(s), {} reused, {} question(s), {} skipped",
        summary.subjects_created,
        summary.subjects_reused,
        summary.questions_imported,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_overrides_attribute_defaults() {
        let attrs = AppAttributes::default();
        let metadata = ImportMetadata {
            level: Some("Postgraduate".to_string()),
            category: Some("  ".to_string()),
            ..Default::default()
        };
        let tags = SubjectTags::resolve(&metadata, &attrs);

        assert_eq!(tags.level.as_deref(), Some("Postgraduate"));
        assert_eq!(tags.exam_type.as_deref(), attrs.first_exam_type());
        assert_eq!(tags.category.as_deref(), attrs.first_subject_type());
    }
}
