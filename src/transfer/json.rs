// src/transfer/json.rs

//! Nested JSON question packs.
//!
//! Object keys are subject names and nesting is the hierarchy. An object
//! that carries a `"Q"` field is a question instead:
//!
//! ```json
//! { "Anatomy": { "Bones": { "1": { "Q": "...", "1": "..", "2": "..", "3": "..", "4": "..", "A": "B", "explain": "..." } } } }
//! ```

use serde_json::{Map, Value};

use crate::{
    error::AppError,
    models::{
        question::{AnswerLetter, Question, QuestionStatus, new_question_id},
        subject::Subject,
    },
    transfer::{ImportPlan, SubjectTags},
};

const QUESTION_MARKER: &str = "Q";

/// Turns a parsed document into an import plan without touching the store.
///
/// Subjects are matched against `existing` (and against ones created earlier
/// in the same document) by case-insensitive name under the same parent.
pub fn plan(doc: &Value, existing: &[Subject], tags: &SubjectTags) -> Result<ImportPlan, AppError> {
    let root = doc
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Import document must be a JSON object".to_string()))?;

    let mut planner = Planner {
        known: existing.to_vec(),
        tags,
        plan: ImportPlan::default(),
    };
    planner.walk(root, None, "")?;
    Ok(planner.plan)
}

struct Planner<'a> {
    known: Vec<Subject>,
    tags: &'a SubjectTags,
    plan: ImportPlan,
}

impl Planner<'_> {
    fn walk(&mut self, node: &Map<String, Value>, parent: Option<&str>, path: &str) -> Result<(), AppError> {
        for (key, value) in node {
            let here = if path.is_empty() { key.clone() } else { format!("{path}/{key}") };
            let Some(child) = value.as_object() else {
                tracing::debug!("Skipping non-object entry at {}", here);
                self.plan.skipped += 1;
                continue;
            };

            if child.contains_key(QUESTION_MARKER) {
                let Some(subject_id) = parent else {
                    tracing::warn!("Question at {} has no subject; skipped", here);
                    self.plan.skipped += 1;
                    continue;
                };
                let question = parse_question(child, subject_id, &here)?;
                self.plan.questions.push(question);
            } else {
                let subject_id = self.subject_for(key, parent);
                self.walk(child, Some(&subject_id), &here)?;
            }
        }
        Ok(())
    }

    /// Id of the subject named `name` under `parent`, planning a new one if needed.
    fn subject_for(&mut self, name: &str, parent: Option<&str>) -> String {
        let wanted = name.trim().to_lowercase();
        if let Some(found) = self
            .known
            .iter()
            .find(|s| s.parent_id.as_deref() == parent && s.name.trim().to_lowercase() == wanted)
        {
            if !self.plan.subjects.iter().any(|s| s.id == found.id) {
                self.plan.reused_subjects += 1;
            }
            return found.id.clone();
        }

        let mut subject = Subject::new(name.trim());
        subject.parent_id = parent.map(str::to_string);
        subject.exam_type = self.tags.exam_type.clone();
        subject.level = self.tags.level.clone();
        subject.category = self.tags.category.clone();

        let id = subject.id.clone();
        self.known.push(subject.clone());
        self.plan.subjects.push(subject);
        id
    }
}

/// Text of a field that may be a string or a number.
fn text(node: &Map<String, Value>, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_question(node: &Map<String, Value>, subject_id: &str, path: &str) -> Result<Question, AppError> {
    let content = text(node, QUESTION_MARKER)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("Question at {} has empty text", path)))?;

    let correct_answer = match text(node, "A").filter(|a| !a.trim().is_empty()) {
        Some(letter) => letter.parse::<AnswerLetter>().map_err(|_| {
            AppError::BadRequest(format!("Question at {} has invalid answer '{}'", path, letter))
        })?,
        None => AnswerLetter::A,
    };

    Ok(Question {
        id: new_question_id(),
        subject_id: subject_id.to_string(),
        content,
        image: None,
        option_a: text(node, "1").unwrap_or_default(),
        option_b: text(node, "2").unwrap_or_default(),
        option_c: text(node, "3").unwrap_or_default(),
        option_d: text(node, "4").unwrap_or_default(),
        option_images: None,
        correct_answer,
        explanation: text(node, "explain").filter(|e| !e.trim().is_empty()),
        explanation_image: None,
        status: QuestionStatus::Unlearned,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tags() -> SubjectTags {
        SubjectTags {
            exam_type: Some("Final exam".to_string()),
            level: Some("Undergraduate".to_string()),
            category: None,
        }
    }

    fn pack() -> Value {
        json!({
            "Anatomy": {
                "1": { "Q": "Largest bone?", "1": "Femur", "2": "Tibia", "3": "Ulna", "4": "Radius", "A": "A", "explain": "Thigh" },
                "Bones": {
                    "1": { "Q": "Bones in the hand?", "1": "27", "2": "12", "3": "8", "4": 5, "A": "a" },
                    "2": { "Q": "Skull bones?", "1": "22", "2": "12", "3": "8", "4": "5" }
                }
            },
            "Loose": { "Q": "orphan question at the top level" }
        })
    }

    #[test]
    fn builds_hierarchy_and_questions() {
        let plan = plan(&pack(), &[], &tags()).unwrap();

        let names: Vec<&str> = plan.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Anatomy", "Bones"]);
        assert_eq!(plan.subjects[1].parent_id.as_deref(), Some(plan.subjects[0].id.as_str()));
        assert_eq!(plan.subjects[0].level.as_deref(), Some("Undergraduate"));

        assert_eq!(plan.questions.len(), 3);
        assert_eq!(plan.questions[0].subject_id, plan.subjects[0].id);
        assert_eq!(plan.questions[1].option_d, "5");
        assert_eq!(plan.questions[2].correct_answer, AnswerLetter::A);
        assert_eq!(plan.questions[0].explanation.as_deref(), Some("Thigh"));
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn reuses_same_name_under_same_parent() {
        let mut anatomy = Subject::new("ANATOMY");
        anatomy.id = "sub-anatomy".to_string();
        let elsewhere = Subject::new("Bones").with_parent("sub-other");

        let plan = plan(&pack(), &[anatomy, elsewhere], &tags()).unwrap();

        assert_eq!(plan.reused_subjects, 1);
        assert_eq!(plan.subjects.len(), 1);
        assert_eq!(plan.subjects[0].name, "Bones");
        assert_eq!(plan.subjects[0].parent_id.as_deref(), Some("sub-anatomy"));
        assert_eq!(plan.questions[0].subject_id, "sub-anatomy");
    }

    #[test]
    fn invalid_letter_fails_whole_plan() {
        let doc = json!({ "S": { "1": { "Q": "?", "A": "E" } } });
        assert!(matches!(plan(&doc, &[], &tags()), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(plan(&json!([1, 2]), &[], &tags()).is_err());
    }
}
