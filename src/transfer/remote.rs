// src/transfer/remote.rs

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;
use validator::Validate;

use crate::{error::AppError, transfer::ImportMetadata};

/// DTO for importing a hosted question pack.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RemoteImportRequest {
    #[validate(url)]
    pub url: String,
    #[serde(flatten)]
    pub metadata: ImportMetadata,
}

/// Checks that `raw` is an absolute http(s) URL.
pub fn parse_pack_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::BadRequest(format!("Invalid pack URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::BadRequest(format!(
            "Unsupported pack URL scheme '{}'",
            other
        ))),
    }
}

/// Downloads and parses a JSON question pack.
pub async fn fetch_pack(url: &Url) -> Result<Value, AppError> {
    tracing::info!("Downloading question pack from {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let text = response.text().await?;

    Ok(serde_json::from_str(&text)?)
}
