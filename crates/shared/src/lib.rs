pub mod conversation;
pub mod credentials;
pub mod error;
pub mod language;

pub mod settings {
    use serde::{Deserialize, Serialize};

    pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
    pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    fn default_gemini_model() -> String {
        DEFAULT_GEMINI_MODEL.to_string()
    }

    fn default_base_url() -> String {
        DEFAULT_GEMINI_BASE_URL.to_string()
    }

    fn default_timeout_secs() -> u64 {
        60
    }

    fn default_language() -> String {
        "en".to_string()
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ModelProvider {
        #[serde(default = "default_gemini_model")]
        pub gemini_model: String, // fixed per build, not user-chosen in the UI
        #[serde(default = "default_base_url")]
        pub base_url: String,
        /// Upper bound for one generateContent round trip
        #[serde(default = "default_timeout_secs")]
        pub request_timeout_secs: u64,
    }

    /// User profile for personalization
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct UserProfile {
        #[serde(default)]
        pub dark_mode: bool,
        /// Last language picked in the selector (display only)
        #[serde(default = "default_language")]
        pub language: String,
    }

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub model: ModelProvider,
        #[serde(default)]
        pub user_profile: UserProfile,
    }

    impl Default for ModelProvider {
        fn default() -> Self {
            Self {
                gemini_model: default_gemini_model(),
                base_url: default_base_url(),
                request_timeout_secs: default_timeout_secs(),
            }
        }
    }

    impl Default for UserProfile {
        fn default() -> Self {
            Self {
                dark_mode: false,
                language: default_language(),
            }
        }
    }

    impl ModelProvider {
        pub fn request_timeout(&self) -> std::time::Duration {
            std::time::Duration::from_secs(self.request_timeout_secs.max(1))
        }
    }
}

pub mod agent_api {
    use std::sync::Arc;

    /// An image attached to a query, carried inline with the request.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct InlineImage {
        pub mime_type: String,
        pub bytes: Arc<[u8]>,
        pub file_name: Option<String>,
    }

    impl InlineImage {
        pub fn new(mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
            Self {
                mime_type: mime_type.into(),
                bytes: bytes.into(),
                file_name: None,
            }
        }

        pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
            self.file_name = Some(name.into());
            self
        }

        pub fn len(&self) -> usize {
            self.bytes.len()
        }

        pub fn is_empty(&self) -> bool {
            self.bytes.is_empty()
        }
    }
}
