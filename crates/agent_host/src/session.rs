//! Chat session: the conversation plus everything the UI needs to drive it.
//!
//! All mutation happens on the thread that owns the session (the UI thread).
//! The provider call runs on a worker and comes back through a channel that
//! the UI polls every frame.

use futures::future::AbortHandle;
use providers::AiClient;
use shared::agent_api::InlineImage;
use shared::conversation::Conversation;
use shared::credentials::{validate_api_key, CredentialStore, KeyFormatError};
use shared::error::ChatError;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::worker::{spawn_exchange, AiResult, ExchangeJob};

/// How a finished exchange resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Answered,
    Failed(ChatError),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiKeyError {
    #[error(transparent)]
    Format(#[from] KeyFormatError),
    #[error("Could not save the API key: {0}")]
    Storage(#[source] anyhow::Error),
}

pub struct ChatSession {
    conversation: Conversation,
    client: AiClient,
    request_timeout: Duration,
    ai_result_rx: Option<Receiver<AiResult>>,
    ai_abort_handle: Option<AbortHandle>,
    thinking_started_at: Option<Instant>,
    error_banner: Option<String>,
    show_api_key_prompt: bool,
}

impl ChatSession {
    /// Start a session with the greeting; asks for a key if none is stored.
    pub fn new(client: AiClient, request_timeout: Duration) -> Self {
        let show_api_key_prompt = client.credentials().get().is_none();
        if show_api_key_prompt {
            tracing::info!("no API key stored, prompting");
        }
        Self {
            conversation: Conversation::new(),
            client,
            request_timeout,
            ai_result_rx: None,
            ai_abort_handle: None,
            thinking_started_at: None,
            error_banner: None,
            show_api_key_prompt,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// True between submit and resolution.
    pub fn is_loading(&self) -> bool {
        self.conversation.is_awaiting_response()
    }

    pub fn thinking_elapsed(&self) -> Option<Duration> {
        self.thinking_started_at.map(|t| t.elapsed())
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error_banner = None;
    }

    pub fn needs_api_key(&self) -> bool {
        self.show_api_key_prompt
    }

    fn credentials(&self) -> &Arc<dyn CredentialStore> {
        self.client.credentials()
    }

    /// Validate and store a key typed into the prompt; closes the prompt on success.
    pub fn submit_api_key(&mut self, input: &str) -> Result<(), ApiKeyError> {
        let key = validate_api_key(input)?;
        self.credentials().save(key).map_err(ApiKeyError::Storage)?;
        self.show_api_key_prompt = false;
        Ok(())
    }

    /// Forget the stored key and re-open the prompt.
    pub fn reset_api_key(&mut self) -> anyhow::Result<()> {
        self.show_api_key_prompt = true;
        self.credentials().remove()
    }

    /// Start an exchange. Rejected input leaves the conversation untouched.
    pub fn submit(&mut self, text: &str, image: Option<InlineImage>) -> Result<(), ChatError> {
        let image = image.map(Arc::new);
        self.conversation.begin_exchange(text, image.clone())?;
        self.error_banner = None;

        let (tx, rx) = channel::<AiResult>();
        let (abort_handle, abort_reg) = AbortHandle::new_pair();
        self.ai_result_rx = Some(rx);
        self.ai_abort_handle = Some(abort_handle);
        self.thinking_started_at = Some(Instant::now());

        tracing::debug!(chars = text.chars().count(), image = image.is_some(), "exchange started");
        spawn_exchange(
            ExchangeJob {
                client: self.client.clone(),
                text: text.to_string(),
                image,
                deadline: self.request_timeout,
            },
            tx,
            abort_reg,
        );
        Ok(())
    }

    /// Start over with just the greeting. Refused while an answer is pending.
    pub fn new_chat(&mut self) -> Result<(), ChatError> {
        self.conversation.reset()?;
        self.error_banner = None;
        tracing::info!("conversation cleared");
        Ok(())
    }

    /// Abort the in-flight call; it resolves as a cancelled exchange.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.ai_abort_handle.take() {
            tracing::info!("cancelling exchange");
            handle.abort();
        }
    }

    /// Check for a finished exchange (called each frame, never blocks).
    pub fn poll(&mut self) -> Option<SessionEvent> {
        let rx = self.ai_result_rx.as_ref()?;
        let result = match rx.try_recv() {
            Ok(ai) => ai.result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(worker_lost()),
        };
        Some(self.finish(result))
    }

    /// Block for up to `timeout` waiting for the exchange to finish.
    pub fn wait(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let rx = self.ai_result_rx.as_ref()?;
        let result = match rx.recv_timeout(timeout) {
            Ok(ai) => ai.result,
            Err(RecvTimeoutError::Timeout) => return None,
            Err(RecvTimeoutError::Disconnected) => Err(worker_lost()),
        };
        Some(self.finish(result))
    }

    fn finish(&mut self, result: Result<String, ChatError>) -> SessionEvent {
        self.ai_result_rx = None;
        self.ai_abort_handle = None;
        self.thinking_started_at = None;

        match result {
            Ok(answer) => {
                self.conversation.complete_exchange(answer);
                SessionEvent::Answered
            }
            Err(error) => {
                self.conversation.fail_exchange(&error);
                self.error_banner = Some(error.to_string());
                if error.is_auth() {
                    self.show_api_key_prompt = true;
                }
                SessionEvent::Failed(error)
            }
        }
    }
}

fn worker_lost() -> ChatError {
    ChatError::Provider("the request stopped unexpectedly".to_string())
}
