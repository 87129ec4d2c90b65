use anyhow::anyhow;
use eframe::egui;
use services::{FileCredentialStore, SettingsStore};
use shared::credentials::CredentialStore;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod chat_view;
mod modals;
mod simple_md;
mod widgets;

mod types;
pub use types::*;

use modals::Modal;
use widgets::image_picker;

const APP_TITLE: &str = "Kisaan Mitra AI";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings_store = SettingsStore::default();
    let (settings, fresh) = settings_store.load_or_default();
    if fresh {
        tracing::info!(path = %settings_store.path().display(), "using default settings");
    }
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::default());
    let session = agent_host::gemini_session(&settings, credentials)?;
    let state = AppState::new(settings, settings_store, session);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_min_inner_size([480.0, 520.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(|_cc| Box::new(KisaanMitraApp { state })),
    )
    .map_err(|e| anyhow!("failed to start window: {}", e))
}

struct KisaanMitraApp {
    state: AppState,
}

impl eframe::App for KisaanMitraApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let s = &mut self.state;

        // Poll for AI response (non-blocking)
        s.poll_ai_response();
        if s.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let Some(path) = image_picker::dropped_image_path(ctx) {
            if !s.is_loading() {
                s.attach_image(&path);
            }
        }

        let dark = s.settings.user_profile.dark_mode;
        ctx.set_visuals(if dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        render_header(s, ctx, dark);
        render_footer(ctx);
        render_composer(s, ctx);
        render_log(s, ctx, dark);

        s.sync_api_key_dialog();
        if s.api_key_dialog.update(ctx) {
            s.handle_api_key_submission();
        }
    }
}

fn render_header(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    egui::TopBottomPanel::top("header")
        .frame(egui::Frame::none().fill(if dark {
            egui::Color32::from_rgb(35, 35, 42)
        } else {
            egui::Color32::from_rgb(240, 248, 240)
        }))
        .show(ctx, |ui| {
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                ui.add_space(16.0);
                ui.heading(
                    egui::RichText::new(format!("🌱 {}", APP_TITLE))
                        .size(22.0)
                        .strong()
                        .color(egui::Color32::from_rgb(22, 163, 74)),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(16.0);
                    if ui.button("⚙ Change API Key").clicked() {
                        s.reset_api_key();
                    }
                    if ui
                        .add_enabled(!s.is_loading(), egui::Button::new("New chat"))
                        .clicked()
                    {
                        s.new_chat();
                    }
                    let theme_icon = if dark { "☀" } else { "🌙" };
                    if ui.button(theme_icon).on_hover_text("Toggle dark mode").clicked() {
                        s.toggle_dark_mode();
                    }
                    let mut changed: Option<String> = None;
                    widgets::language_selector(ui, &mut s.language, |code| {
                        changed = Some(code.to_string())
                    });
                    if let Some(code) = changed {
                        s.set_language(&code);
                    }
                });
            });
            ui.add_space(10.0);
        });
}

fn render_footer(ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("{} - Your Farming Assistant", APP_TITLE))
                    .small()
                    .weak(),
            );
            ui.add_space(4.0);
        });
    });
}

fn render_composer(s: &mut AppState, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
        ui.add_space(8.0);
        let loading = s.is_loading();

        if let Some(image) = &s.pending_image {
            let name = image.file_name.clone().unwrap_or_else(|| "image".to_string());
            let mut remove = false;
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("🖼 {}", name)).color(egui::Color32::from_rgb(22, 163, 74)));
                if ui.add_enabled(!loading, egui::Button::new("✖").small()).clicked() {
                    remove = true;
                }
            });
            if remove {
                s.clear_attachment();
            }
        }
        if let Some(err) = &s.attach_error {
            ui.colored_label(egui::Color32::from_rgb(220, 60, 60), err.as_str());
        }
        if image_picker::is_hovering_files(ctx) {
            ui.label(egui::RichText::new("Drop a photo to attach it").italics().weak());
        }

        ui.horizontal(|ui| {
            let attach = ui
                .add_enabled(!loading, egui::Button::new("🖼").min_size(egui::vec2(40.0, 40.0)))
                .on_hover_text("Attach a crop photo");
            if attach.clicked() {
                if let Some(path) = image_picker::pick_image_path() {
                    s.attach_image(&path);
                }
            }

            let response = ui.add_enabled(
                !loading,
                egui::TextEdit::singleline(&mut s.input_text)
                    .hint_text("Ask your farming question...")
                    .desired_width(ui.available_width() - 80.0)
                    .font(egui::FontId::new(15.0, egui::FontFamily::Proportional)),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                s.send_message();
                response.request_focus();
            }

            if loading {
                let stop = egui::Button::new("Stop").fill(egui::Color32::from_rgb(180, 80, 80));
                if ui.add_sized([70.0, 40.0], stop).clicked() {
                    s.session.cancel();
                }
            } else {
                let send = egui::Button::new("Send").fill(egui::Color32::from_rgb(34, 139, 84));
                if ui.add_enabled_ui(s.can_send(), |ui| ui.add_sized([70.0, 40.0], send)).inner.clicked() {
                    s.send_message();
                }
            }
        });
        ui.add_space(8.0);
    });
}

fn render_log(s: &mut AppState, ctx: &egui::Context, dark: bool) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let mut dismiss = false;
        if let Some(error) = s.session.error_banner() {
            egui::Frame::none()
                .fill(if dark {
                    egui::Color32::from_rgb(70, 35, 35)
                } else {
                    egui::Color32::from_rgb(254, 242, 242)
                })
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(12.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(egui::Color32::from_rgb(185, 28, 28), error);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✖").clicked() {
                                dismiss = true;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
        if dismiss {
            s.session.dismiss_error();
        }

        let loading = s.is_loading();
        let elapsed = s.session.thinking_elapsed();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for msg in s.session.conversation().messages() {
                    ui.add_space(6.0);
                    chat_view::render_message(ui, msg, dark, &mut s.thumbnails);
                    ui.add_space(6.0);
                }
                if loading {
                    ui.add_space(6.0);
                    chat_view::render_thinking(ui, dark, elapsed);
                }
            });
    });
}
