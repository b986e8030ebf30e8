//! Response parser: turns a raw `generateContent` envelope into a typed value.
//!
//! Models often wrap the requested JSON in prose ("Here is the result: ...") or
//! code fences. Only the span from the first `{` to the last `}` is decoded.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use super::{GenerateContentResponse, UsageMetadata};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Model response contained no candidates")]
    NoCandidates,

    #[error("Model response candidate has no text part")]
    MissingText,

    #[error("No JSON object found in model response")]
    NoJsonObject,

    #[error("Model response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A decoded model answer plus the token accounting reported alongside it.
#[derive(Debug)]
pub struct ParsedResponse<T> {
    pub value: T,
    pub usage: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Result<&str, ParseError> {
        let candidate = self.candidates.first().ok_or(ParseError::NoCandidates)?;
        candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .ok_or(ParseError::MissingText)
    }
}

/// Returns the substring from the first `{` through the last `}` inclusive.
pub fn extract_json_object(text: &str) -> Result<&str, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }
    Ok(&text[start..=end])
}

/// Extracts and decodes the JSON object embedded in the model's first answer.
///
/// Missing usage metadata is logged and tolerated; everything else is an error.
pub fn parse_response<T: DeserializeOwned>(
    response: &GenerateContentResponse,
) -> Result<ParsedResponse<T>, ParseError> {
    let text = response.first_text()?;
    let json = extract_json_object(text)?;
    let value = serde_json::from_str(json)?;

    if response.usage_metadata.is_none() {
        warn!("Model response carried no usageMetadata; token counts unavailable");
    }

    Ok(ParsedResponse {
        value,
        usage: response.usage_metadata,
    })
}
