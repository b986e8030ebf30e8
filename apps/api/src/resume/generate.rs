use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::parse::parse_response;
use crate::llm_client::LlmClient;
use crate::models::resume::ExtractedResume;
use crate::resume::extract::extract_text;
use crate::resume::prompts::{build_resume_prompt, RESUME_PROMPT_VERSION};

/// Runs one upload through extraction, prompting, the model call and parsing.
///
/// Strictly forward: any failing stage ends the request with its error and
/// no later stage runs.
pub async fn generate_resume_json(
    request_id: Uuid,
    document: Bytes,
    llm: &LlmClient,
) -> Result<ExtractedResume, AppError> {
    debug!(%request_id, bytes = document.len(), "resume received");

    let resume_text = extract_text(document).await?;
    debug!(%request_id, chars = resume_text.len(), "resume text extracted");

    let prompt = build_resume_prompt(&resume_text);
    debug!(%request_id, prompt_version = RESUME_PROMPT_VERSION, "prompt built");

    let response = llm.generate_content(&prompt).await?;
    debug!(%request_id, candidates = response.candidates.len(), "model responded");

    let parsed = parse_response::<ExtractedResume>(&response)?;
    if let Some(usage) = parsed.usage {
        info!(
            %request_id,
            prompt_tokens = usage.prompt_token_count,
            candidates_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            "Model token usage"
        );
    }

    let mut resume = parsed.value;
    resume.normalize_dates();
    debug!(%request_id, "resume parsed");

    Ok(resume)
}
