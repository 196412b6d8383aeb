// src/transfer/export.rs

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value, json};

use crate::{
    error::AppError,
    models::{question::Question, subject::Subject},
};

/// The whole bank as a nested pack, readable by the JSON importer.
///
/// Each subject maps to an object holding its own questions in stored order,
/// followed by its child subjects. Question keys count up from `"1"` and skip
/// any key a child subject already uses. Siblings whose names match the way
/// the importer matches them share one object. Subjects whose parent no
/// longer exists are not reachable and are left out.
///
/// A nested subject named `"Q"` cannot be written, since the importer would
/// read its parent as a question.
pub fn export_tree(subjects: &[Subject], questions: &[Question]) -> Result<Value, AppError> {
    let mut by_subject: HashMap<&str, Vec<&Question>> = HashMap::new();
    for q in questions {
        by_subject.entry(q.subject_id.as_str()).or_default().push(q);
    }
    let level = children_of(&[], subjects, &by_subject)?;
    Ok(Value::Object(level))
}

/// Subjects under any of `parents` (top level when empty), one entry per merged name.
fn children_of(
    parents: &[&str],
    subjects: &[Subject],
    by_subject: &HashMap<&str, Vec<&Question>>,
) -> Result<Map<String, Value>, AppError> {
    let mut groups: Vec<(String, Vec<&Subject>)> = Vec::new();
    for subject in subjects.iter().filter(|s| match s.parent_id.as_deref() {
        Some(parent) => parents.contains(&parent),
        None => parents.is_empty(),
    }) {
        let key = subject.name.trim().to_lowercase();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(subject),
            None => groups.push((key, vec![subject])),
        }
    }

    let mut level = Map::new();
    for (_, members) in groups {
        let name = members[0].name.trim().to_string();
        if !parents.is_empty() && name == "Q" {
            return Err(AppError::BadRequest(format!(
                "Subject '{}' ({}) cannot be exported: its name is the question marker",
                name, members[0].id
            )));
        }

        let ids: Vec<&str> = members.iter().map(|s| s.id.as_str()).collect();
        let children = children_of(&ids, subjects, by_subject)?;
        let taken: HashSet<&str> = children.keys().map(String::as_str).collect();

        let mut node = Map::new();
        let mut number = 0usize;
        for q in ids.iter().flat_map(|id| by_subject.get(id).into_iter().flatten()) {
            let key = loop {
                number += 1;
                let key = number.to_string();
                if !taken.contains(key.as_str()) {
                    break key;
                }
            };
            node.insert(key, question_entry(q));
        }
        node.extend(children);
        level.insert(name, Value::Object(node));
    }
    Ok(level)
}

fn question_entry(q: &Question) -> Value {
    json!({
        "Q": q.content,
        "1": q.option_a,
        "2": q.option_b,
        "3": q.option_c,
        "4": q.option_d,
        "A": q.correct_answer,
        "explain": q.explanation.as_deref().unwrap_or_default(),
    })
}
