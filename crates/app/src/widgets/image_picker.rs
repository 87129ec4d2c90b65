//! Image attachment for the composer: native file dialog (rfd) or drag and drop.

use anyhow::{anyhow, Context as _, Result};
use image::ImageFormat;
use shared::agent_api::InlineImage;
use std::path::{Path, PathBuf};

/// The provider refuses inline requests above 20 MB.
pub const MAX_REQUEST_BYTES: usize = 20_000_000;

/// Room left in a request for the instruction, the question and the JSON envelope.
pub const REQUEST_HEADROOM: usize = 256 * 1024;

/// Largest picture sent inline: its base64 form plus the headroom fits in one request.
pub const MAX_IMAGE_BYTES: usize = (MAX_REQUEST_BYTES - REQUEST_HEADROOM) / 4 * 3;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "heic", "heif", "bmp"];

/// MIME type from magic bytes, falling back to the file extension.
pub fn detect_mime(bytes: &[u8], path: &Path) -> Option<&'static str> {
    let sniffed = match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some("image/png"),
        Ok(ImageFormat::Jpeg) => Some("image/jpeg"),
        Ok(ImageFormat::WebP) => Some("image/webp"),
        Ok(ImageFormat::Gif) => Some("image/gif"),
        Ok(ImageFormat::Bmp) => Some("image/bmp"),
        _ => None,
    };
    sniffed.or_else(|| {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some("image/png"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "webp" => Some("image/webp"),
            "gif" => Some("image/gif"),
            "heic" => Some("image/heic"),
            "heif" => Some("image/heif"),
            "bmp" => Some("image/bmp"),
            _ => None,
        }
    })
}

/// Read an image file into an attachment.
pub fn load_image(path: &Path) -> Result<InlineImage> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if bytes.is_empty() {
        return Err(anyhow!("{} is empty", path.display()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(anyhow!(
            "{} is too large ({} MB, limit {} MB)",
            path.display(),
            bytes.len() / (1024 * 1024),
            MAX_IMAGE_BYTES / (1024 * 1024)
        ));
    }
    let mime = detect_mime(&bytes, path)
        .ok_or_else(|| anyhow!("{} is not a supported image", path.display()))?;

    let mut image = InlineImage::new(mime, bytes);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        image = image.with_file_name(name);
    }
    Ok(image)
}

/// Blocking native dialog limited to image files.
pub fn pick_image_path() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose a crop photo")
        .add_filter("Images", IMAGE_EXTENSIONS)
        .pick_file()
}

/// First image file dropped onto the window this frame, if any.
pub fn dropped_image_path(ctx: &egui::Context) -> Option<PathBuf> {
    ctx.input(|i| {
        i.raw
            .dropped_files
            .iter()
            .filter_map(|f| f.path.clone())
            .find(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
    })
}

/// Whether files are being dragged over the window.
pub fn is_hovering_files(ctx: &egui::Context) -> bool {
    ctx.input(|i| !i.raw.hovered_files.is_empty())
}
