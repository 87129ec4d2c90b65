//! Builds the single-turn payload sent for each question.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use shared::agent_api::InlineImage;
use shared::error::ChatError;
use std::sync::Arc;

pub const SYSTEM_PROMPT: &str = "You are Kisaan Mitra AI, helping farmers with technical queries. Keep responses:
1. Focused on the specific question asked
2. Brief and direct
3. In the same language as the query
4. Without unnecessary context or symbols
5. With practical, actionable advice";

/// Instruction, question and optional picture for one provider call.
#[derive(Debug, Clone)]
pub struct PromptPayload {
    pub instruction: &'static str,
    /// `None` when the user sent only an image
    pub text: Option<String>,
    pub image: Option<Arc<InlineImage>>,
}

impl PromptPayload {
    /// Image bytes as standard base64, alongside their MIME type.
    pub fn encoded_image(&self) -> Option<(&str, String)> {
        self.image
            .as_ref()
            .map(|img| (img.mime_type.as_str(), STANDARD.encode(&img.bytes)))
    }
}

/// Validate the input and assemble the payload.
pub fn assemble(text: &str, image: Option<Arc<InlineImage>>) -> Result<PromptPayload, ChatError> {
    let text = text.trim();
    if text.is_empty() && image.is_none() {
        return Err(ChatError::EmptyInput);
    }
    Ok(PromptPayload {
        instruction: SYSTEM_PROMPT,
        text: (!text.is_empty()).then(|| text.to_string()),
        image,
    })
}
