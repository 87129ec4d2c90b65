//! Reusable widgets for the chat screen.

pub mod image_picker;
pub mod language_selector;

pub use language_selector::language_selector;
