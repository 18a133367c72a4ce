//! Document upload API.
//!
//! - POST `/document` - Multipart upload of a classroom document
//!
//! Stored documents are served back from `GET /uploads/{name}` at the
//! application root so the conversion service can fetch them.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::post,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::uploads::{DocumentStore, MAX_DOCUMENT_BYTES, UploadError};

#[derive(Clone)]
pub struct UploadState {
    pub documents: Arc<DocumentStore>,
}

pub fn router(state: UploadState) -> Router {
    Router::new()
        .route("/document", post(upload_document))
        // Document ceiling plus multipart framing overhead
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + 1024 * 1024))
        .with_state(state)
}

/// Accept a multipart upload with a `document` field and store it on disk.
async fn upload_document(
    State(state): State<UploadState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("Invalid multipart data"))?
    {
        if field.name() != Some("document") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::bad_request("Document file name is missing"))?;

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("Failed to read document data"))?;

        let stored = match state.documents.save(&file_name, &data).await {
            Ok(stored) => stored,
            Err(e @ UploadError::DisallowedType(_)) => {
                return Err(ApiError::bad_request(e.to_string()));
            }
            Err(UploadError::Io(e)) => {
                tracing::error!(error = %e, "Failed to store document");
                return Err(ApiError::internal("Failed to store document"));
            }
        };

        return Ok(Json(stored));
    }

    Err(ApiError::bad_request("No document provided"))
}

/// Serve a stored document. Unknown or unsafe names are a plain 404.
pub async fn serve_document(
    State(state): State<UploadState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (data, mime) = state
        .documents
        .open(&name)
        .await
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    Ok(([(header::CONTENT_TYPE, mime)], data))
}
