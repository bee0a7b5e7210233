//! PDF text extraction.
//!
//! Documents arrive as URLs (the upload collaborator stores the files); this
//! module fetches the raw bytes and turns them into plain text. Downloaded
//! bytes are spilled into a named temp file that is removed when the guard
//! drops, on every exit path.

use std::io::Write;

use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::errors::AppError;

/// Fetches the raw bytes of a document by URL.
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<Bytes, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::Extraction(format!("Failed to fetch document from {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Extraction(format!(
            "Failed to fetch document from {url}: HTTP {status}"
        )));
    }

    response
        .bytes()
        .await
        .map_err(|e| AppError::Extraction(format!("Failed to read document body from {url}: {e}")))
}

/// Extracts plain text from PDF bytes. Blocking; callers on the async runtime
/// should wrap this in `spawn_blocking`.
pub fn extract_text(pdf_bytes: &[u8]) -> Result<String, AppError> {
    let mut tmp = NamedTempFile::new()
        .map_err(|e| AppError::Extraction(format!("Failed to create temp file: {e}")))?;
    tmp.write_all(pdf_bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| AppError::Extraction(format!("Failed to write temp file: {e}")))?;

    pdf_extract::extract_text(tmp.path())
        .map_err(|e| AppError::Extraction(format!("Unreadable PDF: {e}")))
}
