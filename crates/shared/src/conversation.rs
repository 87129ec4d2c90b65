//! Conversation log and exchange phase.
//!
//! The log is append-only while a session runs: one user message when an
//! exchange starts, one bot message (answer or error) when it resolves.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::agent_api::InlineImage;
use crate::error::ChatError;

pub const GREETING: &str = "नमस्ते! मैं किसान मित्र AI हूं। आप कृषि संबंधी कोई भी प्रश्न पूछ सकते हैं या फसल की तस्वीर अपलोड कर सकते हैं।";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    id: String,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
    image: Option<Arc<InlineImage>>,
    is_error: bool,
}

impl Message {
    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
            image: None,
            is_error: false,
        }
    }

    pub fn user(content: impl Into<String>, image: Option<Arc<InlineImage>>) -> Self {
        Self {
            image,
            ..Self::new(Sender::User, content)
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Sender::Bot, content)
    }

    pub fn bot_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(Sender::Bot, content)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn image(&self) -> Option<&Arc<InlineImage>> {
        self.image.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Format timestamp for display
    pub fn formatted_time(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    Idle,
    AwaitingResponse,
}

/// Ordered message log plus the phase of the current exchange.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    phase: ExchangePhase,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A conversation seeded with the standard greeting.
    pub fn new() -> Self {
        Self::with_greeting(GREETING)
    }

    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![Message::bot(greeting)],
            phase: ExchangePhase::Idle,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.phase == ExchangePhase::AwaitingResponse
    }

    /// Start an exchange: append the user's message and wait for the answer.
    ///
    /// Nothing is appended when validation fails.
    pub fn begin_exchange(
        &mut self,
        text: &str,
        image: Option<Arc<InlineImage>>,
    ) -> Result<&Message, ChatError> {
        if self.is_awaiting_response() {
            return Err(ChatError::Busy);
        }
        if text.trim().is_empty() && image.is_none() {
            return Err(ChatError::EmptyInput);
        }
        self.messages.push(Message::user(text, image));
        self.phase = ExchangePhase::AwaitingResponse;
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Resolve the pending exchange with the provider's answer.
    pub fn complete_exchange(&mut self, answer: impl Into<String>) -> &Message {
        if !self.is_awaiting_response() {
            tracing::warn!("completing an exchange that was not pending");
        }
        self.messages.push(Message::bot(answer));
        self.phase = ExchangePhase::Idle;
        &self.messages[self.messages.len() - 1]
    }

    /// Resolve the pending exchange with an error-flagged bot message.
    pub fn fail_exchange(&mut self, error: &ChatError) -> &Message {
        if !self.is_awaiting_response() {
            tracing::warn!("failing an exchange that was not pending");
        }
        self.messages.push(Message::bot_error(error.to_string()));
        self.phase = ExchangePhase::Idle;
        &self.messages[self.messages.len() - 1]
    }

    /// Drop everything but a fresh greeting. Refused while an answer is pending.
    pub fn reset(&mut self) -> Result<(), ChatError> {
        if self.is_awaiting_response() {
            return Err(ChatError::Busy);
        }
        *self = Self::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_has_greeting() {
        let convo = Conversation::new();
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.messages()[0].sender(), Sender::Bot);
        assert_eq!(convo.messages()[0].content(), GREETING);
        assert_eq!(convo.phase(), ExchangePhase::Idle);
    }

    #[test]
    fn test_round_trip_adds_two_messages() {
        let mut convo = Conversation::new();
        convo.begin_exchange("What fertilizer for wheat?", None).unwrap();
        assert!(convo.is_awaiting_response());
        assert_eq!(convo.len(), 2);

        convo.complete_exchange("Use urea at sowing.");
        assert_eq!(convo.phase(), ExchangePhase::Idle);
        assert_eq!(convo.len(), 3);

        let user = &convo.messages()[1];
        assert_eq!(user.sender(), Sender::User);
        assert_eq!(user.content(), "What fertilizer for wheat?");
        let bot = convo.last().unwrap();
        assert_eq!(bot.sender(), Sender::Bot);
        assert_eq!(bot.content(), "Use urea at sowing.");
        assert!(!bot.is_error());
    }

    #[test]
    fn test_empty_input_does_not_mutate() {
        let mut convo = Conversation::new();
        assert_eq!(convo.begin_exchange("   ", None).unwrap_err(), ChatError::EmptyInput);
        assert_eq!(convo.len(), 1);
        assert_eq!(convo.phase(), ExchangePhase::Idle);
    }

    #[test]
    fn test_image_only_is_accepted() {
        let mut convo = Conversation::new();
        let image = Arc::new(InlineImage::new("image/png", vec![1u8, 2, 3]));
        let msg = convo.begin_exchange("", Some(image.clone())).unwrap();
        assert_eq!(msg.image(), Some(&image));
        assert_eq!(msg.content(), "");
    }

    #[test]
    fn test_second_submit_while_pending_is_busy() {
        let mut convo = Conversation::new();
        convo.begin_exchange("first", None).unwrap();
        assert_eq!(convo.begin_exchange("second", None).unwrap_err(), ChatError::Busy);
        assert_eq!(convo.len(), 2);
    }

    #[test]
    fn test_failed_exchange_appends_error_message() {
        let mut convo = Conversation::new();
        convo.begin_exchange("hello", None).unwrap();
        let msg = convo.fail_exchange(&ChatError::Transport("connection reset".into()));
        assert!(msg.is_error());
        assert_eq!(msg.content(), "AI Error: connection reset");
        assert_eq!(convo.phase(), ExchangePhase::Idle);
        assert_eq!(convo.len(), 3);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut convo = Conversation::new();
        convo.begin_exchange("a", None).unwrap();
        convo.complete_exchange("b");
        let ids: std::collections::HashSet<_> = convo.messages().iter().map(|m| m.id()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_reset_only_when_idle() {
        let mut convo = Conversation::new();
        convo.begin_exchange("a", None).unwrap();
        assert_eq!(convo.reset().unwrap_err(), ChatError::Busy);
        convo.complete_exchange("b");
        convo.reset().unwrap();
        assert_eq!(convo.len(), 1);
    }
}
