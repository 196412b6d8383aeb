// src/handlers/maintenance.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{engine::controller::SessionController, error::AppError, store::Store};

#[derive(Debug, Deserialize)]
pub struct WipeRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Deletes every record in every collection. Requires `{"confirm": true}`.
pub async fn wipe_all(
    State(store): State<Store>,
    State(sessions): State<SessionController>,
    Json(payload): Json<WipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !payload.confirm {
        return Err(AppError::BadRequest(
            "Wiping all data requires {\"confirm\": true}".to_string(),
        ));
    }

    sessions.discard().await;
    store.clear_all_data().await?;
    Ok(StatusCode::NO_CONTENT)
}
