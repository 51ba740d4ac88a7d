use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ApiError;
use crate::metadata;

/// Fixed message of the liveness check.
pub const HEALTH_MESSAGE: &str = "PNG metadata service is up and running";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Body of `POST /update_metadata`.
#[derive(Debug, Deserialize)]
pub struct UpdateMetadataRequest {
    /// Base64-encoded PNG.
    pub image_b64: String,
    /// Stored as JSON under the `UserComment` keyword.
    pub user_comment: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateMetadataResponse {
    /// Base64-encoded PNG carrying the comment.
    pub updated_image: String,
}

/// Handler for `GET /healthchecker`
pub async fn healthchecker() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "success".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// Handler for `POST /update_metadata`
pub async fn update_metadata(
    payload: Result<Json<UpdateMetadataRequest>, JsonRejection>,
) -> Result<Json<UpdateMetadataResponse>, ApiError> {
    let Json(request) = payload?;
    log::debug!(
        "update_metadata: {} base64 chars, {} comment key(s)",
        request.image_b64.len(),
        request.user_comment.len()
    );

    // Decoding and re-encoding is CPU-bound; keep it off the async workers.
    let updated_image = tokio::task::spawn_blocking(move || {
        metadata::rewrite(&request.image_b64, &request.user_comment)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("rewrite task failed: {e}")))??;

    log::info!("Updated PNG metadata ({} base64 chars)", updated_image.len());
    Ok(Json(UpdateMetadataResponse { updated_image }))
}
