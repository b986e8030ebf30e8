//! Turns an uploaded PDF into plain text.

use bytes::Bytes;
use thiserror::Error;

const PDF_SIGNATURE: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Error extracting text from PDF: uploaded file is empty")]
    Empty,

    #[error("Error extracting text from PDF: uploaded file is not a PDF document")]
    NotPdf,

    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    #[error("Error extracting text from PDF: document contains no extractable text")]
    NoText,
}

/// Extracts the full text of a PDF, or fails without returning partial text.
///
/// Parsing is CPU bound and runs on the blocking pool. A panic inside the PDF
/// library is reported as [`ExtractionError::Pdf`].
pub async fn extract_text(document: Bytes) -> Result<String, ExtractionError> {
    if document.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if !has_pdf_signature(&document) {
        return Err(ExtractionError::NotPdf);
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&document))
        .await
        .map_err(|e| ExtractionError::Pdf(format!("PDF parser aborted: {e}")))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

fn has_pdf_signature(document: &[u8]) -> bool {
    let start = document
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(document.len());
    document[start..].starts_with(PDF_SIGNATURE)
}
