//! Agent Host - drives the conversation loop
//!
//! Owns the conversation, the API key prompt state and the background
//! exchange with the provider. The UI only reads from a [`ChatSession`] and
//! forwards user actions to it.

pub mod session;
pub mod worker;

pub use session::{ApiKeyError, ChatSession, SessionEvent};

use anyhow::Result;
use providers::{AiClient, GeminiClient};
use shared::credentials::CredentialStore;
use shared::settings::AppSettings;
use std::sync::Arc;

/// Build a session talking to Gemini with the configured model and timeout.
pub fn gemini_session(
    settings: &AppSettings,
    credentials: Arc<dyn CredentialStore>,
) -> Result<ChatSession> {
    let provider = GeminiClient::new(&settings.model)?;
    tracing::info!(model = provider.model(), "using gemini provider");
    let client = AiClient::new(Arc::new(provider), credentials);
    Ok(ChatSession::new(client, settings.model.request_timeout()))
}
