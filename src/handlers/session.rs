// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::{DEFAULT_QUIZ_MINUTES, DEFAULT_QUIZ_QUESTION_COUNT},
    engine::{
        controller::SessionController,
        session::{ExamSession, ExamView, SubmitOutcome, retry_session},
    },
    error::AppError,
    models::{
        exam_config::SubjectConfig,
        exam_result::{ExamResult, SubjectResult},
        question::AnswerLetter,
    },
    store::Store,
};

/// DTO for a one-subject quiz picked by the user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SelfSelectRequest {
    #[validate(length(min = 1))]
    pub subject_id: String,
    #[validate(range(min = 1, max = 1000))]
    pub count: Option<u32>,
    #[validate(range(min = 1, max = 600))]
    pub time: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: String,
    pub answer: AnswerLetter,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Advanced {
        #[serde(rename = "subjectResult")]
        subject_result: SubjectResult,
        session: ExamView,
    },
    Completed {
        result: ExamResult,
    },
}

/// Starts the exam described by a saved template.
pub async fn start_exam(
    State(store): State<Store>,
    State(sessions): State<SessionController>,
    Path(config_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let config = store
        .get_exam_config(&config_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Exam template {} not found", config_id)))?;

    let session = ExamSession::new(config.name, config.subjects.0)?;
    let view = sessions.start_exam(session).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Starts a single-subject quiz over a subject's recursive pool.
pub async fn start_self_select(
    State(store): State<Store>,
    State(sessions): State<SessionController>,
    Json(payload): Json<SelfSelectRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let subject = store
        .get_subject(&payload.subject_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Subject {} not found", payload.subject_id)))?;

    let config = SubjectConfig {
        subject_id: subject.id,
        subject_name: subject.name.clone(),
        count: payload.count.unwrap_or(DEFAULT_QUIZ_QUESTION_COUNT),
        time: payload.time.unwrap_or(DEFAULT_QUIZ_MINUTES),
    };
    let view = sessions.start_exam(ExamSession::single(subject.name, config)).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Re-runs a stored result with fresh draws of the same shape.
pub async fn retry(
    State(store): State<Store>,
    State(sessions): State<SessionController>,
    Path(result_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = store
        .get_result(&result_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {} not found", result_id)))?;

    let view = sessions.start_exam(retry_session(&result)?).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// The running exam, without answers.
pub async fn current(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.exam_view().await?))
}

pub async fn answer(
    State(sessions): State<SessionController>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(sessions.answer(&payload.question_id, payload.answer).await?))
}

/// Submits the current subject; the last one completes and saves the exam.
pub async fn submit(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    let response = match sessions.submit().await? {
        SubmitOutcome::Advanced { subject_result, .. } => SubmitResponse::Advanced {
            subject_result,
            session: sessions.exam_view().await?,
        },
        SubmitOutcome::Completed(result) => SubmitResponse::Completed { result },
    };
    Ok(Json(response))
}

/// Leaves the active session. Nothing is recorded.
pub async fn discard(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    sessions.discard().await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn last_result(State(sessions): State<SessionController>) -> Result<impl IntoResponse, AppError> {
    let result = sessions
        .last_result()
        .await
        .ok_or_else(|| AppError::NotFound("No exam has been completed yet".to_string()))?;
    Ok(Json(result))
}
