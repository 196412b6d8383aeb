// src/handlers/subjects.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::subject::{CreateSubjectRequest, Subject, SubjectFilter, UpdateSubjectRequest},
    store::{Store, hierarchy},
};

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuestionListParams {
    #[serde(default)]
    pub recursive: bool,
}

/// Lists subjects in creation order, optionally filtered by tag, name or root status.
pub async fn list_subjects(
    State(store): State<Store>,
    Query(filter): Query<SubjectFilter>,
) -> Result<impl IntoResponse, AppError> {
    let subjects: Vec<Subject> = store
        .get_subjects()
        .await?
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();
    Ok(Json(subjects))
}

pub async fn get_subject(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subject = store
        .get_subject(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", id)))?;
    Ok(Json(subject))
}

/// Finds a subject by exact name, ignoring case.
pub async fn lookup_subject(
    State(store): State<Store>,
    Query(params): Query<LookupParams>,
) -> Result<impl IntoResponse, AppError> {
    let subject = store
        .find_subject_by_name(&params.name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No subject named '{}'", params.name)))?;
    Ok(Json(subject))
}

/// Creates a subject. A given parent must exist.
pub async fn create_subject(
    State(store): State<Store>,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let parent_id = payload.parent_id.filter(|p| !p.is_empty());
    if let Some(parent) = &parent_id {
        if store.get_subject(parent).await?.is_none() {
            return Err(AppError::BadRequest(format!("Parent subject {} not found", parent)));
        }
    }

    let mut subject = Subject::new(payload.name.trim());
    subject.parent_id = parent_id;
    subject.exam_type = payload.exam_type;
    subject.level = payload.level;
    subject.category = payload.category;

    store.save_subjects(std::slice::from_ref(&subject)).await?;
    tracing::info!("Subject '{}' created ({})", subject.name, subject.id);

    Ok((StatusCode::CREATED, Json(subject)))
}

/// Renames, retags or moves a subject.
///
/// A move that would put the subject under itself or one of its descendants is refused.
pub async fn update_subject(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let subjects = store.get_subjects().await?;
    let mut subject = subjects
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", id)))?;

    if let Some(parent) = payload.parent_id {
        if parent.is_empty() {
            subject.parent_id = None;
        } else {
            if !subjects.iter().any(|s| s.id == parent) {
                return Err(AppError::BadRequest(format!("Parent subject {} not found", parent)));
            }
            if hierarchy::descendant_closure(&subjects, &id).contains(&parent) {
                return Err(AppError::BadRequest(
                    "A subject cannot be moved under itself or its descendants".to_string(),
                ));
            }
            subject.parent_id = Some(parent);
        }
    }
    if let Some(name) = payload.name {
        subject.name = name.trim().to_string();
    }
    if let Some(exam_type) = payload.exam_type {
        subject.exam_type = Some(exam_type).filter(|v| !v.is_empty());
    }
    if let Some(level) = payload.level {
        subject.level = Some(level).filter(|v| !v.is_empty());
    }
    if let Some(category) = payload.category {
        subject.category = Some(category).filter(|v| !v.is_empty());
    }

    store.save_subjects(std::slice::from_ref(&subject)).await?;
    Ok(Json(subject))
}

/// Deletes a subject together with its descendants and all their questions.
pub async fn delete_subject(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if store.get_subject(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Subject {} not found", id)));
    }
    store.delete_subject(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Questions of a subject; with `recursive=true`, those of its whole subtree.
pub async fn subject_questions(
    State(store): State<Store>,
    Path(id): Path<String>,
    Query(params): Query<QuestionListParams>,
) -> Result<impl IntoResponse, AppError> {
    let questions = if params.recursive {
        store.get_questions_by_subject_recursive(&id).await?
    } else {
        store.get_questions_by_subject(&id).await?
    };
    Ok(Json(questions))
}
