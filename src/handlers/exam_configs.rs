// src/handlers/exam_configs.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::exam_config::{SaveExamConfigRequest, new_exam_config_id},
    store::Store,
};

pub async fn list_exam_configs(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_exam_configs().await?))
}

/// Saves a new exam template. Subject names are stored as given.
pub async fn create_exam_config(
    State(store): State<Store>,
    Json(payload): Json<SaveExamConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let config = payload.into_config(new_exam_config_id());
    store.save_exam_config(&config).await?;
    tracing::info!("Exam template '{}' saved ({})", config.name, config.id);

    Ok((StatusCode::CREATED, Json(config)))
}

pub async fn update_exam_config(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<SaveExamConfigRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if store.get_exam_config(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Exam template {} not found", id)));
    }
    let config = payload.into_config(id);
    store.save_exam_config(&config).await?;

    Ok(Json(config))
}

/// Deleting a missing template is not an error.
pub async fn delete_exam_config(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_exam_config(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
