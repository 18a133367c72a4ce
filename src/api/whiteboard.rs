//! Document-conversion API endpoints.
//!
//! - POST `/convert` - Submit a document for conversion
//! - GET `/convert/{task_uuid}` - Relay conversion task status
//!
//! These routes are unauthenticated: the conversion callback flow is
//! driven by the whiteboard widget before a classroom identity exists.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::convert::{ConversionClient, ConversionOptions, ConvertError};

#[derive(Clone)]
pub struct WhiteboardState {
    pub convert: Arc<ConversionClient>,
}

pub fn router(state: WhiteboardState) -> Router {
    Router::new()
        .route("/convert", post(start_conversion))
        .route("/convert/{task_uuid}", get(poll_conversion))
        .with_state(state)
}

fn convert_error(e: ConvertError) -> ApiError {
    match e {
        ConvertError::Unconfigured
        | ConvertError::InvalidUrl(_)
        | ConvertError::LocalUrl(_)
        | ConvertError::Unreachable(_) => ApiError::bad_request(e.to_string()),
        ConvertError::Upstream { .. } => ApiError::upstream("Conversion request failed", e),
        ConvertError::Transport(_) => ApiError::upstream("Conversion service unreachable", e),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartConversionRequest {
    file_url: Option<String>,
    file_name: Option<String>,
    #[serde(default)]
    config: ConversionOptions,
}

/// Submit a document for conversion and relay the task id.
async fn start_conversion(
    State(state): State<WhiteboardState>,
    Json(payload): Json<StartConversionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (file_url, file_name) = match (payload.file_url.as_deref(), payload.file_name.as_deref()) {
        (Some(url), Some(name)) if !url.is_empty() && !name.is_empty() => (url, name),
        _ => return Err(ApiError::bad_request("fileUrl and fileName are required")),
    };

    let started = state
        .convert
        .start(file_url, file_name, &payload.config)
        .await
        .map_err(convert_error)?;

    Ok(Json(started))
}

/// Relay conversion task status verbatim.
async fn poll_conversion(
    State(state): State<WhiteboardState>,
    Path(task_uuid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if task_uuid.trim().is_empty() {
        return Err(ApiError::bad_request("taskUuid is required"));
    }

    let status = state
        .convert
        .poll(&task_uuid)
        .await
        .map_err(convert_error)?;

    Ok(Json(status))
}
