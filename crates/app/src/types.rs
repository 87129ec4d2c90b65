//! Application state for the chat window
//!
//! Wraps the [`ChatSession`] with the UI-only bits: composer contents,
//! pending attachment, the API key dialog and the language selector.

use agent_host::{ChatSession, SessionEvent};
use services::SettingsStore;
use shared::agent_api::InlineImage;
use shared::language::LanguageSelection;
use shared::settings::AppSettings;
use std::path::Path;

use crate::chat_view::ThumbnailCache;
use crate::modals::{ApiKeyDialog, Modal};
use crate::widgets::image_picker;

/// Main application state
pub struct AppState {
    pub settings: AppSettings,
    settings_store: SettingsStore,
    pub session: ChatSession,
    /// Current input text
    pub input_text: String,
    /// Picture waiting to be sent with the next question
    pub pending_image: Option<InlineImage>,
    /// Why the last attachment attempt failed
    pub attach_error: Option<String>,
    pub api_key_dialog: ApiKeyDialog,
    pub language: LanguageSelection,
    pub thumbnails: ThumbnailCache,
}

impl AppState {
    pub fn new(settings: AppSettings, settings_store: SettingsStore, session: ChatSession) -> Self {
        let language = LanguageSelection::from_code(&settings.user_profile.language);
        Self {
            settings,
            settings_store,
            session,
            input_text: String::new(),
            pending_image: None,
            attach_error: None,
            api_key_dialog: ApiKeyDialog::new("api_key_dialog"),
            language,
            thumbnails: ThumbnailCache::default(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Send is enabled only with something to send and no pending answer.
    pub fn can_send(&self) -> bool {
        !self.is_loading() && (!self.input_text.trim().is_empty() || self.pending_image.is_some())
    }

    pub fn send_message(&mut self) {
        if !self.can_send() {
            return;
        }
        let image = self.pending_image.take();
        match self.session.submit(&self.input_text, image.clone()) {
            Ok(()) => {
                self.input_text.clear();
                self.attach_error = None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "submit rejected");
                self.pending_image = image;
            }
        }
    }

    pub fn attach_image(&mut self, path: &Path) {
        match image_picker::load_image(path) {
            Ok(image) => {
                tracing::debug!(mime = %image.mime_type, bytes = image.len(), "image attached");
                self.pending_image = Some(image);
                self.attach_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not attach image");
                self.attach_error = Some(e.to_string());
            }
        }
    }

    pub fn clear_attachment(&mut self) {
        self.pending_image = None;
        self.attach_error = None;
    }

    /// Check for completed AI responses (called each frame)
    pub fn poll_ai_response(&mut self) -> Option<SessionEvent> {
        let event = self.session.poll()?;
        match &event {
            SessionEvent::Answered => tracing::debug!("answer appended"),
            SessionEvent::Failed(e) => tracing::debug!(kind = ?e.kind(), "error appended"),
        }
        Some(event)
    }

    /// Open the key dialog whenever the session wants a key.
    pub fn sync_api_key_dialog(&mut self) {
        if self.session.needs_api_key() && !self.api_key_dialog.is_open() {
            self.api_key_dialog.open();
        }
    }

    /// Store a key the dialog accepted; keep the dialog open on failure.
    pub fn handle_api_key_submission(&mut self) {
        let Some(key) = self.api_key_dialog.take_result() else {
            return;
        };
        match self.session.submit_api_key(&key) {
            Ok(()) => self.api_key_dialog.close(),
            Err(e) => {
                tracing::error!(error = %e, "API key not accepted");
                self.api_key_dialog.set_error(e.to_string());
            }
        }
    }

    /// Clear the log back to the greeting, dropping cached thumbnails with it.
    pub fn new_chat(&mut self) {
        match self.session.new_chat() {
            Ok(()) => self.thumbnails.clear(),
            Err(e) => tracing::debug!(error = %e, "new chat refused"),
        }
    }

    /// "Change API Key": forget the key and show the prompt again.
    pub fn reset_api_key(&mut self) {
        if let Err(e) = self.session.reset_api_key() {
            tracing::error!(error = %e, "failed to remove API key");
        }
        self.sync_api_key_dialog();
    }

    /// The selection is remembered but has no effect on answers.
    pub fn set_language(&mut self, code: &str) {
        tracing::info!(language = code, "language selected");
        self.settings.user_profile.language = code.to_string();
        self.save_settings();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.settings.user_profile.dark_mode = !self.settings.user_profile.dark_mode;
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            tracing::warn!(error = %e, "could not save settings");
        }
    }
}
