//! Modal dialogs for the application.

pub mod api_key_dialog;

pub use api_key_dialog::ApiKeyDialog;

use egui::Context;

/// Trait for modal dialogs.
pub trait Modal {
    /// Update and render the modal. Returns true when the user submitted a value
    /// this frame; closing is left to the caller.
    fn update(&mut self, ctx: &Context) -> bool;

    /// Returns true if the modal is currently open.
    fn is_open(&self) -> bool;

    /// Open the modal.
    fn open(&mut self);

    /// Close the modal.
    fn close(&mut self);
}

/// Result from a modal dialog.
#[derive(Debug, Clone)]
pub enum ModalResult<T> {
    /// User hasn't submitted anything yet
    Pending,
    /// User confirmed/submitted
    Confirmed(T),
}

impl<T> ModalResult<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ModalResult::Pending)
    }

    pub fn take_value(self) -> Option<T> {
        match self {
            ModalResult::Confirmed(v) => Some(v),
            ModalResult::Pending => None,
        }
    }
}
