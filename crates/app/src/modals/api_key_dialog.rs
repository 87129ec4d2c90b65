//! API key prompt.
//!
//! Blocks the chat until a key with the expected prefix is entered:
//! - Masked input
//! - Entry buffer zeroed on close with zeroize
//! - Enter key submission
//!
//! There is no cancel; the app cannot talk to the provider without a key.

use super::{Modal, ModalResult};
use egui::{Align2, Area, Context, Id, Key, RichText, TextEdit, Vec2};
use shared::credentials::validate_api_key;
use zeroize::Zeroizing;

const KEY_HELP_URL: &str = "https://makersuite.google.com/app/apikey";

pub struct ApiKeyDialog {
    is_open: bool,
    /// The key being typed (securely zeroed on drop)
    input: Zeroizing<String>,
    result: ModalResult<Zeroizing<String>>,
    /// Format or storage error shown under the input
    error: Option<String>,
    id: Id,
}

impl ApiKeyDialog {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            is_open: false,
            input: Zeroizing::new(String::new()),
            result: ModalResult::Pending,
            error: None,
            id: Id::new(id),
        }
    }

    /// Show an error after a rejected submit (e.g. the key could not be saved).
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Take a submitted key, if any.
    pub fn take_result(&mut self) -> Option<Zeroizing<String>> {
        std::mem::replace(&mut self.result, ModalResult::Pending).take_value()
    }

    pub fn has_result(&self) -> bool {
        !self.result.is_pending()
    }

    /// Run the local format check; on success the key becomes the result.
    fn try_submit(&mut self) -> bool {
        match validate_api_key(&self.input) {
            Ok(key) => {
                self.result = ModalResult::Confirmed(Zeroizing::new(key.to_string()));
                self.error = None;
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

impl Modal for ApiKeyDialog {
    fn update(&mut self, ctx: &Context) -> bool {
        if !self.is_open {
            return false;
        }

        let mut submitted = false;

        // Semi-transparent background overlay
        Area::new(self.id.with("overlay"))
            .anchor(Align2::LEFT_TOP, Vec2::ZERO)
            .show(ctx, |ui| {
                let screen_rect = ctx.screen_rect();
                ui.allocate_response(screen_rect.size(), egui::Sense::click());
                ui.painter()
                    .rect_filled(screen_rect, 0.0, egui::Color32::from_black_alpha(128));
            });

        egui::Window::new("🔑 Enter Your Gemini API Key")
            .id(self.id.with("window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(380.0);
                ui.add_space(8.0);

                ui.label(
                    "To use Kisaan Mitra AI, you need to provide your Google Gemini API key.",
                );
                ui.horizontal(|ui| {
                    ui.label("Get your key from");
                    ui.hyperlink_to("Google AI Studio", KEY_HELP_URL);
                });
                ui.add_space(8.0);

                let response = ui.add(
                    TextEdit::singleline(&mut *self.input)
                        .password(true)
                        .desired_width(f32::INFINITY)
                        .hint_text("Enter your API key"),
                );
                if !response.has_focus() && self.input.is_empty() {
                    response.request_focus();
                }
                if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    submitted = self.try_submit();
                }

                if let Some(ref error) = self.error {
                    ui.add_space(4.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 60, 60), error);
                }

                ui.add_space(12.0);
                if ui
                    .add_sized([ui.available_width(), 32.0], egui::Button::new("Save API Key"))
                    .clicked()
                {
                    submitted = self.try_submit();
                }

                ui.add_space(4.0);
                ui.label(RichText::new("🔒 Stored only on this computer").small().weak());
            });

        submitted
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn open(&mut self) {
        self.is_open = true;
        self.input = Zeroizing::new(String::new());
        self.result = ModalResult::Pending;
        self.error = None;
    }

    fn close(&mut self) {
        self.is_open = false;
        self.input = Zeroizing::new(String::new());
    }
}
