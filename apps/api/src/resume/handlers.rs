use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ExtractedResume;
use crate::resume::generate::generate_resume_json;
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// POST /api/resume/ai/generate
///
/// Accepts a multipart upload with a `file` field holding the PDF resume and
/// returns the structured resume extracted by the model.
pub async fn handle_generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractedResume>, AppError> {
    let request_id = Uuid::new_v4();
    let document = read_file_field(multipart).await?;
    info!(%request_id, bytes = document.len(), "Generating structured resume");

    let resume = generate_resume_json(request_id, document, &state.llm).await?;
    Ok(Json(resume))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }
    Err(AppError::BadRequest(format!(
        "Missing multipart field '{FILE_FIELD}'"
    )))
}
