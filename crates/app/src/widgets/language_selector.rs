//! Language dropdown in the header.

use egui::{Id, Order, Pos2, Rect, Response, RichText, Ui};
use shared::language::{LanguageSelection, LANGUAGES};

/// Draw the selector button and, while open, its dropdown.
///
/// `on_change` receives the newly selected code. A click anywhere outside
/// the button and the menu, or Escape, closes the menu.
pub fn language_selector(
    ui: &mut Ui,
    selection: &mut LanguageSelection,
    on_change: impl FnOnce(&str),
) -> Response {
    let current = selection.selected();
    let button = ui.button(format!("🌐 {} {}", current.flag, current.name));
    if button.clicked() {
        selection.toggle();
    }

    if selection.is_open() {
        let mut picked: Option<&'static str> = None;
        let menu = egui::Area::new(Id::new("language_selector_menu"))
            .order(Order::Foreground)
            .fixed_pos(button.rect.left_bottom())
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(160.0);
                    for lang in LANGUAGES.iter() {
                        let is_current = lang.code == current.code;
                        let label = RichText::new(format!("{}  {}", lang.flag, lang.name));
                        if ui.selectable_label(is_current, label).clicked() {
                            picked = Some(lang.code);
                        }
                    }
                });
            });
        if let Some(code) = picked {
            selection.select(code, on_change);
        } else {
            let (press, escape) = ui.input(|i| {
                let press = if i.pointer.any_pressed() {
                    i.pointer.interact_pos()
                } else {
                    None
                };
                (press, i.key_pressed(egui::Key::Escape))
            });
            if escape || pressed_outside(press, menu.response.rect, button.rect) {
                selection.close();
            }
        }
    }

    button
}

/// Whether a pointer press landed outside both the menu and its button.
fn pressed_outside(press: Option<Pos2>, menu: Rect, button: Rect) -> bool {
    match press {
        Some(pos) => !menu.contains(pos) && !button.contains(pos),
        None => false,
    }
}
