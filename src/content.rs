//! Codec for the opaque `content` string the backend stores alongside a
//! test: base64 over the JSON form of the question list. The backend never
//! inspects it, so the whole question model lives client-side.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::Result;
use crate::models::question::Question;

pub fn encode(questions: &[Question]) -> Result<String> {
    let json = serde_json::to_vec(questions)?;
    Ok(STANDARD.encode(json))
}

/// Decodes a content blob back into questions. An empty or whitespace-only
/// blob is a test saved before any questions existed and decodes to an empty
/// list rather than an error.
pub fn decode(content: &str) -> Result<Vec<Question>> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let bytes = STANDARD.decode(content)?;
    Ok(serde_json::from_slice(&bytes)?)
}
