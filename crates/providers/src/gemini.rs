use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::error::ChatError;
use shared::settings::ModelProvider;
use std::time::Duration;

use crate::prompt::PromptPayload;
use crate::GenerativeProvider;

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    reason: Option<String>,
}

pub struct GeminiClient {
    http: Client,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &ModelProvider) -> anyhow::Result<Self> {
        let timeout = config.request_timeout();
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http(config, http))
    }

    pub fn with_http(config: &ModelProvider, http: Client) -> Self {
        Self {
            http,
            model: config.gemini_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, api_key: &str, payload: &PromptPayload) -> Result<String, ChatError> {
        let req = build_request(payload);
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }
        let body: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| ChatError::Provider(format!("unreadable gemini response: {}", e)))?;
        extract_text(body)
    }
}

impl GeminiClient {
    fn transport_error(&self, e: reqwest::Error) -> ChatError {
        if e.is_timeout() {
            ChatError::Timeout(self.timeout)
        } else {
            ChatError::Transport(e.to_string())
        }
    }
}

fn build_request(payload: &PromptPayload) -> GeminiRequest {
    let mut parts = vec![GeminiPart {
        text: Some(payload.instruction.to_string()),
        ..Default::default()
    }];
    if let Some(text) = &payload.text {
        parts.push(GeminiPart {
            text: Some(text.clone()),
            ..Default::default()
        });
    }
    if let Some((mime_type, data)) = payload.encoded_image() {
        parts.push(GeminiPart {
            inline_data: Some(GeminiInlineData {
                mime_type: mime_type.to_string(),
                data,
            }),
            ..Default::default()
        });
    }
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user".to_string(),
            parts,
        }],
    }
}

fn extract_text(body: GeminiResponse) -> Result<String, ChatError> {
    let Some(candidate) = body.candidates.into_iter().next() else {
        return match body.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(ChatError::Blocked(reason)),
            None => Err(ChatError::EmptyResponse),
        };
    };
    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    if !text.trim().is_empty() {
        return Ok(text);
    }
    match candidate.finish_reason.as_deref() {
        Some(reason @ ("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT")) => {
            Err(ChatError::Blocked(reason.to_string()))
        }
        _ => Err(ChatError::EmptyResponse),
    }
}

fn classify_failure(status: StatusCode, body: &str) -> ChatError {
    let parsed = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();
    let message = match &parsed {
        Some(env) if !env.error.message.is_empty() => env.error.message.clone(),
        _ => {
            let body = body.trim();
            if body.is_empty() {
                status.to_string()
            } else if body.chars().count() > 800 {
                format!("{}...", body.chars().take(800).collect::<String>())
            } else {
                body.to_string()
            }
        }
    };

    let key_rejected = parsed.as_ref().map_or(false, |env| {
        env.error
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
            || matches!(
                env.error.status.as_deref(),
                Some("UNAUTHENTICATED" | "PERMISSION_DENIED")
            )
    });

    if key_rejected || status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        ChatError::Unauthorized(message)
    } else {
        ChatError::Provider(format!("gemini error: {}: {}", status.as_u16(), message))
    }
}
