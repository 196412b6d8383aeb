// src/handlers/transfer.rs

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::{
    error::AppError,
    store::Store,
    transfer::{
        self, ImportMetadata, SubjectTags, export, json,
        remote::{self, RemoteImportRequest},
        table,
    },
};

/// DTO for importing a nested JSON pack given inline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonImportRequest {
    pub data: Value,
    #[serde(flatten)]
    pub metadata: ImportMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableImportParams {
    pub subject_id: String,
}

async fn import_document(
    store: &Store,
    doc: &Value,
    metadata: &ImportMetadata,
) -> Result<transfer::ImportSummary, AppError> {
    let tags = SubjectTags::resolve(metadata, &store.get_attributes().await);
    let existing = store.get_subjects().await?;
    let plan = json::plan(doc, &existing, &tags)?;
    transfer::apply(store, plan).await
}

/// Imports a nested subject/question document.
pub async fn import_json(
    State(store): State<Store>,
    Json(payload): Json<JsonImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let summary = import_document(&store, &payload.data, &payload.metadata).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Imports a CSV table or `.xlsx` workbook (header row required) into one existing subject.
pub async fn import_table(
    State(store): State<Store>,
    Query(params): Query<TableImportParams>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    if store.get_subject(&params.subject_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Subject {} not found", params.subject_id)));
    }

    let plan = table::plan_upload(&body, &params.subject_id)?;
    let summary = transfer::apply(&store, plan).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Downloads a hosted JSON pack and imports it.
pub async fn import_remote(
    State(store): State<Store>,
    Json(payload): Json<RemoteImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let url = remote::parse_pack_url(&payload.url)?;
    let doc = remote::fetch_pack(&url).await?;
    let summary = import_document(&store, &doc, &payload.metadata).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// The whole bank as one nested JSON document.
pub async fn export_all(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    let subjects = store.get_subjects().await?;
    let questions = store.get_all_questions().await?;
    let tree = export::export_tree(&subjects, &questions)?;
    Ok(Json(tree))
}
