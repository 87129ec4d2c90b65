//! Provider access: prompt assembly, the Gemini HTTP client and the
//! [`AiClient`] front door used by the chat session.

pub mod client;
pub mod gemini;
pub mod prompt;

pub use client::{AiClient, CallOptions};
pub use gemini::GeminiClient;
pub use prompt::{PromptPayload, SYSTEM_PROMPT};

use async_trait::async_trait;
use shared::error::ChatError;

/// A hosted model that turns one prompt into one text answer.
///
/// Implementations classify their own failures (see [`ChatError::kind`]).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, api_key: &str, payload: &PromptPayload) -> Result<String, ChatError>;
}
