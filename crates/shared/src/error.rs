//! Typed errors for a chat exchange.
//!
//! Every failure surfaced to the conversation carries an [`ErrorKind`] chosen
//! where the failure happens, so callers never have to inspect message text
//! to decide whether the user must re-enter their API key.

use std::time::Duration;
use thiserror::Error;

/// Coarse classification used by the UI to pick a recovery path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or rejected credential; the key prompt should be shown again
    Auth,
    /// Input rejected locally before any provider call
    Validation,
    /// Provider, network, deadline or cancellation failure
    Generation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Please provide a question or upload an image")]
    EmptyInput,

    #[error("Please wait for the current answer before asking again")]
    Busy,

    #[error("API key not found")]
    MissingApiKey,

    #[error("AI Error: the API key was rejected ({0})")]
    Unauthorized(String),

    #[error("AI Error: {0}")]
    Provider(String),

    #[error("AI Error: {0}")]
    Transport(String),

    #[error("AI Error: no answer within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,

    #[error("AI Error: the request was blocked ({0})")]
    Blocked(String),

    #[error("AI Error: the provider returned an empty response")]
    EmptyResponse,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::EmptyInput | ChatError::Busy => ErrorKind::Validation,
            ChatError::MissingApiKey | ChatError::Unauthorized(_) => ErrorKind::Auth,
            ChatError::Provider(_)
            | ChatError::Transport(_)
            | ChatError::Timeout(_)
            | ChatError::Cancelled
            | ChatError::Blocked(_)
            | ChatError::EmptyResponse => ErrorKind::Generation,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ChatError::EmptyInput.kind(), ErrorKind::Validation);
        assert_eq!(ChatError::Busy.kind(), ErrorKind::Validation);
        assert_eq!(ChatError::MissingApiKey.kind(), ErrorKind::Auth);
        assert!(ChatError::Unauthorized("403".into()).is_auth());
        assert_eq!(ChatError::Cancelled.kind(), ErrorKind::Generation);
        assert_eq!(
            ChatError::Timeout(Duration::from_secs(5)).kind(),
            ErrorKind::Generation
        );
    }

    #[test]
    fn test_messages_match_ui_wording() {
        assert_eq!(ChatError::MissingApiKey.to_string(), "API key not found");
        assert_eq!(
            ChatError::Provider("quota exceeded".into()).to_string(),
            "AI Error: quota exceeded"
        );
        assert_eq!(
            ChatError::Timeout(Duration::from_secs(30)).to_string(),
            "AI Error: no answer within 30 seconds"
        );
    }
}
