//! Stateless request/response bridge to the provider.

use futures::future::{AbortRegistration, Abortable};
use shared::agent_api::InlineImage;
use shared::credentials::CredentialStore;
use shared::error::ChatError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::prompt;
use crate::GenerativeProvider;

/// Per-call bounds on a generation request.
#[derive(Default)]
pub struct CallOptions {
    /// Give up after this long
    pub deadline: Option<Duration>,
    /// Abort when the paired `AbortHandle` fires
    pub abort: Option<AbortRegistration>,
}

impl CallOptions {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_abort(mut self, abort: AbortRegistration) -> Self {
        self.abort = Some(abort);
        self
    }
}

#[derive(Clone)]
pub struct AiClient {
    provider: Arc<dyn GenerativeProvider>,
    credentials: Arc<dyn CredentialStore>,
}

impl AiClient {
    pub fn new(provider: Arc<dyn GenerativeProvider>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            provider,
            credentials,
        }
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Ask the provider one question, optionally with a picture.
    ///
    /// Input is checked before the key is looked up, so an empty submit never
    /// triggers the key prompt.
    pub async fn generate_response(
        &self,
        text: &str,
        image: Option<Arc<InlineImage>>,
        options: CallOptions,
    ) -> Result<String, ChatError> {
        let payload = prompt::assemble(text, image)?;
        let api_key = self.credentials.get().ok_or(ChatError::MissingApiKey)?;

        let started = Instant::now();
        tracing::info!(
            provider = self.provider.name(),
            has_text = payload.text.is_some(),
            image_bytes = payload.image.as_ref().map_or(0, |i| i.len()),
            "sending query"
        );

        let deadline = options.deadline;
        let provider = &self.provider;
        let call = async move {
            match deadline {
                Some(limit) => {
                    match tokio::time::timeout(limit, provider.generate(&api_key, &payload)).await {
                        Ok(result) => result,
                        Err(_) => Err(ChatError::Timeout(limit)),
                    }
                }
                None => provider.generate(&api_key, &payload).await,
            }
        };

        let result = match options.abort {
            Some(reg) => match Abortable::new(call, reg).await {
                Ok(result) => result,
                Err(_aborted) => Err(ChatError::Cancelled),
            },
            None => call.await,
        };

        match &result {
            Ok(text) => tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                chars = text.chars().count(),
                "answer received"
            ),
            Err(e) => tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                kind = ?e.kind(),
                error = %e,
                "generation failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptPayload;
    use async_trait::async_trait;
    use futures::future::AbortHandle;
    use parking_lot::Mutex;
    use shared::error::ErrorKind;

    #[derive(Default)]
    struct FixedKey(Mutex<Option<String>>);

    impl CredentialStore for FixedKey {
        fn save(&self, key: &str) -> anyhow::Result<()> {
            *self.0.lock() = Some(key.to_string());
            Ok(())
        }
        fn get(&self) -> Option<String> {
            self.0.lock().clone()
        }
        fn remove(&self) -> anyhow::Result<()> {
            self.0.lock().take();
            Ok(())
        }
    }

    /// Replies after `delay` with `reply`, recording what it was sent.
    struct ScriptedProvider {
        reply: Result<String, ChatError>,
        delay: Duration,
        seen: Mutex<Vec<(String, Option<String>, bool)>>,
    }

    impl ScriptedProvider {
        fn new(reply: Result<String, ChatError>) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl GenerativeProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn generate(&self, api_key: &str, payload: &PromptPayload) -> Result<String, ChatError> {
            self.seen
                .lock()
                .push((api_key.to_string(), payload.text.clone(), payload.image.is_some()));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone()
        }
    }

    fn client(provider: Arc<ScriptedProvider>, key: Option<&str>) -> AiClient {
        let store = FixedKey::default();
        if let Some(key) = key {
            store.save(key).unwrap();
        }
        AiClient::new(provider, Arc::new(store))
    }

    #[tokio::test]
    async fn test_returns_provider_text() {
        let provider = Arc::new(ScriptedProvider::new(Ok("Use urea at sowing.".into())));
        let ai = client(provider.clone(), Some("AIxyz123"));
        let text = ai
            .generate_response("What fertilizer for wheat?", None, CallOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "Use urea at sowing.");

        let seen = provider.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "AIxyz123");
        assert_eq!(seen[0].1.as_deref(), Some("What fertilizer for wheat?"));
        assert!(!seen[0].2);
    }

    #[tokio::test]
    async fn test_empty_input_fails_before_provider() {
        let provider = Arc::new(ScriptedProvider::new(Ok("unused".into())));
        let ai = client(provider.clone(), None);
        let err = ai
            .generate_response("  ", None, CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(provider.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_auth() {
        let provider = Arc::new(ScriptedProvider::new(Ok("unused".into())));
        let ai = client(provider.clone(), None);
        let err = ai
            .generate_response("hello", None, CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::MissingApiKey);
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(provider.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_image_reaches_provider() {
        let provider = Arc::new(ScriptedProvider::new(Ok("Leaf rust.".into())));
        let ai = client(provider.clone(), Some("AIxyz"));
        let img = Arc::new(InlineImage::new("image/jpeg", vec![0xff, 0xd8, 0xff]));
        ai.generate_response("", Some(img), CallOptions::default())
            .await
            .unwrap();
        let seen = provider.seen.lock();
        assert_eq!(seen[0].1, None);
        assert!(seen[0].2);
    }

    #[tokio::test]
    async fn test_provider_error_passes_through() {
        let provider = Arc::new(ScriptedProvider::new(Err(ChatError::Transport(
            "network unreachable".into(),
        ))));
        let ai = client(provider, Some("AIxyz"));
        let err = ai
            .generate_response("hello", None, CallOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "AI Error: network unreachable");
        assert_eq!(err.kind(), ErrorKind::Generation);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let provider = Arc::new(
            ScriptedProvider::new(Ok("too late".into())).slow(Duration::from_secs(5)),
        );
        let ai = client(provider, Some("AIxyz"));
        let err = ai
            .generate_response(
                "hello",
                None,
                CallOptions::default().with_deadline(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::Timeout(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_abort_cancels_call() {
        let provider = Arc::new(
            ScriptedProvider::new(Ok("too late".into())).slow(Duration::from_secs(5)),
        );
        let ai = client(provider, Some("AIxyz"));
        let (handle, reg) = AbortHandle::new_pair();
        let call = ai.generate_response("hello", None, CallOptions::default().with_abort(reg));
        handle.abort();
        assert_eq!(call.await.unwrap_err(), ChatError::Cancelled);
    }
}
