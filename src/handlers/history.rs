// src/handlers/history.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    engine::review,
    error::AppError,
    models::exam_result::ExamResult,
    store::Store,
};

/// All results, newest first.
pub async fn list_history(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_history().await?))
}

async fn load(store: &Store, id: &str) -> Result<ExamResult, AppError> {
    store
        .get_result(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Result {} not found", id)))
}

pub async fn get_result(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load(&store, &id).await?))
}

/// The result's questions grouped per subject, with the answers given.
pub async fn review_result(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = load(&store, &id).await?;
    Ok(Json(review::project(&result)))
}
