//! Message log rendering.

use anyhow::Result;
use shared::agent_api::InlineImage;
use shared::conversation::{Message, Sender};
use std::collections::HashMap;

use crate::simple_md;

const THUMBNAIL_MAX: u32 = 320;

const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(34, 139, 84);
const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);

/// Decode and shrink an attached picture for display.
pub fn decode_thumbnail(bytes: &[u8]) -> Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes)?;
    let image = if image.width() > THUMBNAIL_MAX || image.height() > THUMBNAIL_MAX {
        image.thumbnail(THUMBNAIL_MAX, THUMBNAIL_MAX)
    } else {
        image
    };
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, &rgba))
}

/// Textures for message images, created on first display.
#[derive(Default)]
pub struct ThumbnailCache {
    /// `None` marks an image that failed to decode, so it is not retried every frame
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    pub fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        key: &str,
        image: &InlineImage,
    ) -> Option<&egui::TextureHandle> {
        self.textures
            .entry(key.to_string())
            .or_insert_with(|| match decode_thumbnail(&image.bytes) {
                Ok(color_image) => Some(ctx.load_texture(
                    format!("msg-{}", key),
                    color_image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    tracing::warn!(error = %e, mime = %image.mime_type, "could not decode attached image");
                    None
                }
            })
            .as_ref()
    }

    pub fn clear(&mut self) {
        self.textures.clear();
    }
}

pub fn render_message(
    ui: &mut egui::Ui,
    msg: &Message,
    dark: bool,
    thumbnails: &mut ThumbnailCache,
) {
    let is_user = msg.sender() == Sender::User;

    let (fill, text_color) = if is_user {
        (USER_BUBBLE, egui::Color32::WHITE)
    } else if msg.is_error() {
        (
            if dark {
                egui::Color32::from_rgb(70, 35, 35)
            } else {
                egui::Color32::from_rgb(254, 242, 242)
            },
            if dark {
                egui::Color32::from_rgb(250, 170, 170)
            } else {
                ERROR_TEXT
            },
        )
    } else if dark {
        (
            egui::Color32::from_rgb(50, 50, 58),
            egui::Color32::from_rgb(220, 220, 230),
        )
    } else {
        (
            egui::Color32::from_rgb(245, 245, 248),
            egui::Color32::from_rgb(40, 40, 50),
        )
    };

    let layout = if is_user {
        egui::Layout::right_to_left(egui::Align::Min)
    } else {
        egui::Layout::left_to_right(egui::Align::Min)
    };

    ui.with_layout(layout, |ui| {
        ui.add_space(8.0);
        egui::Frame::none()
            .fill(fill)
            .rounding(egui::Rounding::same(12.0))
            .inner_margin(egui::Margin::same(12.0))
            .show(ui, |ui| {
                ui.set_max_width(560.0);
                ui.vertical(|ui| {
                    if let Some(image) = msg.image() {
                        match thumbnails.get_or_load(ui.ctx(), msg.id(), image) {
                            Some(texture) => {
                                ui.add(
                                    egui::Image::new(egui::load::SizedTexture::from_handle(
                                        texture,
                                    ))
                                    .max_width(240.0)
                                    .rounding(egui::Rounding::same(8.0)),
                                );
                            }
                            None => {
                                let name = image.file_name.as_deref().unwrap_or("image");
                                ui.label(
                                    egui::RichText::new(format!("🖼 {}", name))
                                        .color(text_color)
                                        .italics(),
                                );
                            }
                        }
                    }
                    if msg.is_error() {
                        ui.label(
                            egui::RichText::new(format!("⚠ {}", msg.content()))
                                .color(text_color)
                                .size(15.0),
                        );
                    } else if !msg.content().is_empty() {
                        simple_md::render_content(ui, msg.content(), text_color);
                    }
                    ui.label(
                        egui::RichText::new(msg.formatted_time())
                            .small()
                            .color(text_color.gamma_multiply(0.7)),
                    );
                });
            });
    });
}

/// Bouncing dots shown while an answer is pending, with seconds waited once it drags on.
pub fn render_thinking(ui: &mut egui::Ui, dark: bool, elapsed: Option<std::time::Duration>) {
    egui::Frame::none()
        .fill(if dark {
            egui::Color32::from_rgb(50, 50, 58)
        } else {
            egui::Color32::from_rgb(230, 230, 235)
        })
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(12.0))
        .show(ui, |ui| {
            let time = ui.input(|i| i.time);
            let dots = match ((time * 3.0) as i32) % 4 {
                0 => "●○○",
                1 => "○●○",
                2 => "○○●",
                _ => "○○○",
            };
            let waited = elapsed.map(|d| d.as_secs()).unwrap_or(0);
            let text = if waited >= 3 {
                format!("{}  {}s", dots, waited)
            } else {
                dots.to_string()
            };
            ui.label(
                egui::RichText::new(text)
                    .color(if dark {
                        egui::Color32::from_rgb(160, 160, 180)
                    } else {
                        egui::Color32::from_rgb(100, 100, 110)
                    })
                    .size(14.0),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_small_image_keeps_size() {
        let color_image = decode_thumbnail(&png_bytes(8, 4)).unwrap();
        assert_eq!(color_image.size, [8, 4]);
    }

    #[test]
    fn test_large_image_is_shrunk() {
        let color_image = decode_thumbnail(&png_bytes(1280, 640)).unwrap();
        assert_eq!(color_image.size, [320, 160]);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(decode_thumbnail(b"definitely not an image").is_err());
    }
}
