//! Credential storage seam.
//!
//! The AI client receives an `Arc<dyn CredentialStore>` at construction and
//! reads the key right before each request.

use anyhow::Result;

/// Required prefix of a Gemini API key
pub const API_KEY_PREFIX: &str = "AI";

/// Durable storage for a single API key.
pub trait CredentialStore: Send + Sync {
    /// Persist the key, replacing any existing value.
    fn save(&self, key: &str) -> Result<()>;

    /// The stored key, or `None` if never set or removed.
    fn get(&self) -> Option<String>;

    /// Delete the stored key. Removing an absent key is not an error.
    fn remove(&self) -> Result<()>;
}

/// Why a key typed into the credential prompt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyFormatError {
    #[error("Please enter a valid API key")]
    Empty,
    #[error("Invalid API key format. Key should start with \"AI\"")]
    BadPrefix,
}

/// Superficial format check applied before a key is saved.
///
/// Returns the trimmed key.
pub fn validate_api_key(input: &str) -> Result<&str, KeyFormatError> {
    let key = input.trim();
    if key.is_empty() {
        return Err(KeyFormatError::Empty);
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(KeyFormatError::BadPrefix);
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_prefixed_key() {
        assert_eq!(validate_api_key("AIxyz123"), Ok("AIxyz123"));
        assert_eq!(validate_api_key("  AIxyz123\n"), Ok("AIxyz123"));
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert_eq!(validate_api_key(""), Err(KeyFormatError::Empty));
        assert_eq!(validate_api_key("   \t"), Err(KeyFormatError::Empty));
    }

    #[test]
    fn test_validate_rejects_wrong_prefix() {
        assert_eq!(validate_api_key("sk-abc"), Err(KeyFormatError::BadPrefix));
        assert_eq!(validate_api_key("ai-lowercase"), Err(KeyFormatError::BadPrefix));
    }
}
