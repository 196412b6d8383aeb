// src/handlers/study.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    engine::{controller::SessionController, study::Navigation},
    error::AppError,
    handlers::session::AnswerRequest,
    store::Store,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStudyRequest {
    pub subject_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub question_id: String,
}

/// Starts practising a subject's whole recursive pool.
pub async fn start(
    State(store): State<Store>,
    State(sessions): State<SessionController>,
    Json(payload): Json<StartStudyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subject = store
        .get_subject(&payload.subject_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", payload.subject_id)))?;

    let view = sessions.start_study(&subject.id, &subject.name).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn current(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.study_view().await?))
}

/// Locks in an answer and returns the feedback for it.
pub async fn answer(
    State(sessions): State<SessionController>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.study_answer(&payload.question_id, payload.answer).await?))
}

pub async fn reset(
    State(sessions): State<SessionController>,
    Json(payload): Json<ResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.study_reset(&payload.question_id).await?))
}

pub async fn go_to(
    State(sessions): State<SessionController>,
    Json(to): Json<Navigation>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.study_navigate(to).await?))
}

/// Ends the study session.
pub async fn stop(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    sessions.study_view().await?;
    sessions.discard().await;
    Ok(StatusCode::NO_CONTENT)
}
