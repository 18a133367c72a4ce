//! On-disk storage for uploaded classroom documents.
//!
//! Documents land in a flat directory under uuid-prefixed names and are
//! served back verbatim. Only document types the conversion service
//! understands are accepted.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

/// Upload size ceiling: 100 MB.
pub const MAX_DOCUMENT_BYTES: usize = 100 * 1024 * 1024;

/// Accepted document extensions and their MIME types.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("ppt", "application/vnd.ms-powerpoint"),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

/// Errors from document storage.
#[derive(Debug)]
pub enum UploadError {
    /// Extension not in the allowlist
    DisallowedType(String),
    Io(io::Error),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::DisallowedType(name) => write!(
                f,
                "Unsupported document type: {}. Allowed: pdf, ppt, pptx, doc, docx",
                name
            ),
            UploadError::Io(e) => write!(f, "Failed to store document: {}", e),
        }
    }
}

impl std::error::Error for UploadError {}

/// A stored document as reported back to the uploader.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub file_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: &'static str,
}

/// Look up the MIME type for a file name, `None` when the extension is not
/// an accepted document type.
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit('.').next()?.to_ascii_lowercase();
    ALLOWED_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| *mime)
}

/// Reduce a client-supplied file name to a safe flat name.
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Flat on-disk document store.
pub struct DocumentStore {
    dir: PathBuf,
    public_base: String,
}

impl DocumentStore {
    /// Create the store, making the directory if needed. `public_base` is
    /// the externally resolvable URL prefix uploaded files are served from.
    pub fn new(dir: impl Into<PathBuf>, public_base: &str) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            public_base: public_base.trim_end_matches('/').to_string(),
        })
    }

    /// Persist an uploaded document. The stored name is uuid-prefixed so
    /// repeated uploads of the same file never collide.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredDocument, UploadError> {
        let mime_type = mime_for(original_name)
            .ok_or_else(|| UploadError::DisallowedType(original_name.to_string()))?;

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitize(original_name));
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, data).await.map_err(UploadError::Io)?;

        Ok(StoredDocument {
            file_url: format!("{}/uploads/{}", self.public_base, stored_name),
            file_name: stored_name,
            file_size: data.len() as u64,
            mime_type,
        })
    }

    /// Read a stored document back. Returns `None` for unknown names and
    /// for anything that is not a plain flat file name.
    pub async fn open(&self, stored_name: &str) -> Option<(Vec<u8>, &'static str)> {
        if stored_name.contains('/') || stored_name.contains('\\') || stored_name.contains("..") {
            return None;
        }

        let path = self.dir.join(stored_name);
        let data = tokio::fs::read(&path).await.ok()?;
        let mime = mime_for(stored_name).unwrap_or("application/octet-stream");
        Some((data, mime))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
