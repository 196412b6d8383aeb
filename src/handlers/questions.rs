// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, new_question_id},
    store::Store,
};

/// Lists every question in insertion order.
pub async fn list_questions(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_all_questions().await?))
}

pub async fn get_question(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let question = store
        .get_question(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;
    Ok(Json(question))
}

/// Adds a question to an existing subject and bumps the subject's question count.
pub async fn create_question(
    State(store): State<Store>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if store.get_subject(&payload.subject_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Subject {} not found",
            payload.subject_id
        )));
    }

    let question = payload.into_question(new_question_id());
    store.add_questions(std::slice::from_ref(&question)).await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Replaces a question's content. Subject counters are left as they are.
pub async fn update_question(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let existing = store
        .get_question(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Question {} not found", id)))?;

    let mut question = payload.into_question(id);
    question.status = existing.status;
    store.save_questions(std::slice::from_ref(&question)).await?;

    Ok(Json(question))
}
