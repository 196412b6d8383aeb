// src/handlers/attributes.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::attributes::{AppAttributes, AttributeKind},
    store::Store,
};

#[derive(Debug, Deserialize)]
pub struct AddAttributeRequest {
    pub value: String,
}

/// Returns the tag lists, or the defaults when none are stored.
pub async fn get_attributes(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_attributes().await))
}

/// Replaces all three lists at once.
pub async fn replace_attributes(
    State(store): State<Store>,
    Json(attrs): Json<AppAttributes>,
) -> Result<impl IntoResponse, AppError> {
    store.save_attributes(&attrs).await?;
    Ok(Json(attrs))
}

/// Adds one value to a list. Adding an existing value changes nothing.
pub async fn add_attribute(
    State(store): State<Store>,
    Path(kind): Path<AttributeKind>,
    Json(req): Json<AddAttributeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut attrs = store.get_attributes().await;
    if attrs.add(kind, &req.value)? {
        store.save_attributes(&attrs).await?;
        tracing::info!("Attribute {:?} '{}' added", kind, req.value.trim());
    }
    Ok(Json(attrs))
}

/// Removes one value from a list. Subjects already tagged with it keep the tag.
pub async fn remove_attribute(
    State(store): State<Store>,
    Path((kind, value)): Path<(AttributeKind, String)>,
) -> Result<impl IntoResponse, AppError> {
    let mut attrs = store.get_attributes().await;
    if !attrs.remove(kind, &value) {
        return Err(AppError::NotFound(format!("Attribute '{}' not found", value)));
    }
    store.save_attributes(&attrs).await?;
    Ok(Json(attrs))
}
