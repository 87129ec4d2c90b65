//! Local persistence for the chat app: the API key and user settings.

pub mod config;
pub mod credentials;

pub use config::{config_dir, SettingsStore};
pub use credentials::{FileCredentialStore, MemoryCredentialStore};
